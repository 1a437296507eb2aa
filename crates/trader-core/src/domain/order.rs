//! 주문 타입.
//!
//! 이 모듈은 트레이딩 시스템의 주문 관련 타입을 정의합니다:
//! - `Side` - 주문 방향 (매수/매도)
//! - `OrderType` - 주문 유형 (시장가, 지정가, 스톱)
//! - `OrderOutcome` - 종료된 주문의 결과 (체결/취소)
//! - `Order` - 주문 엔티티

use crate::types::{Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 주문 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 포지션 변화 부호 (매수 +1, 매도 -1).
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// 주문 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// 시장가 주문
    Market,
    /// 지정가 주문
    Limit,
    /// 스톱 시장가 주문
    Stop,
    /// 스톱 지정가 주문
    StopLimit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Stop => write!(f, "STOP"),
            OrderType::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

/// 종료된 주문의 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderOutcome {
    /// 체결됨 (체결 수량이 0이 아님)
    Filled,
    /// 취소됨 (체결 수량이 0)
    Canceled,
}

impl std::fmt::Display for OrderOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderOutcome::Filled => write!(f, "executed"),
            OrderOutcome::Canceled => write!(f, "canceled"),
        }
    }
}

/// 주문 엔티티.
///
/// 로컬에서 생성된 주문은 ID가 빈 문자열이며, 거래소가 ID를 부여합니다.
/// 비활성 상태가 되면 체결 수량에 따라 체결 또는 취소로 종료됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// 거래소 주문 ID (부여 전에는 빈 문자열)
    #[serde(default)]
    pub id: String,
    /// 주문 방향
    pub side: Side,
    /// 주문 유형
    pub order_type: OrderType,
    /// 주문 수량
    pub quantity: Quantity,
    /// 지정가
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Price>,
    /// 스톱 가격
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Price>,
    /// 거래소에 대기 중인지 여부
    pub active: bool,
    /// 체결 수량
    pub executed_amount: Quantity,
    /// 평균 체결 가격
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_price: Option<Price>,
    /// 생성 타임스탬프
    pub created_at: DateTime<Utc>,
}

impl Order {
    fn new(side: Side, order_type: OrderType, quantity: Quantity) -> Self {
        Self {
            id: String::new(),
            side,
            order_type,
            quantity,
            limit_price: None,
            stop_price: None,
            active: true,
            executed_amount: Decimal::ZERO,
            executed_price: None,
            created_at: Utc::now(),
        }
    }

    /// 시장가 주문을 생성합니다.
    pub fn market(side: Side, quantity: Quantity) -> Self {
        Self::new(side, OrderType::Market, quantity)
    }

    /// 지정가 주문을 생성합니다.
    pub fn limit(side: Side, quantity: Quantity, price: Price) -> Self {
        Self {
            limit_price: Some(price),
            ..Self::new(side, OrderType::Limit, quantity)
        }
    }

    /// 스톱 시장가 주문을 생성합니다.
    pub fn stop(side: Side, quantity: Quantity, stop_price: Price) -> Self {
        Self {
            stop_price: Some(stop_price),
            ..Self::new(side, OrderType::Stop, quantity)
        }
    }

    /// 거래소 주문 ID를 설정합니다.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// 거래소가 ID를 부여했는지 확인합니다.
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// 종료된 주문의 결과를 반환합니다. 활성 주문이면 `None`.
    pub fn outcome(&self) -> Option<OrderOutcome> {
        if self.active {
            None
        } else if self.executed_amount.is_zero() {
            Some(OrderOutcome::Canceled)
        } else {
            Some(OrderOutcome::Filled)
        }
    }

    /// 남은 체결 수량을 반환합니다.
    pub fn remaining_quantity(&self) -> Quantity {
        self.quantity - self.executed_amount
    }
}
