//! 계좌 상태.

use super::order::Order;
use crate::types::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 현재 계좌 스냅샷.
///
/// 잔고 필드는 거래소가 채우고, 미체결 주문과 주문 이력은 조정(reconciliation)
/// 단계에서만 갱신됩니다. 주문 이력은 추가만 가능합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    /// 총 자산
    pub equity: Decimal,
    /// 사용 가능 잔고
    pub available_balance: Decimal,
    /// 현재 포지션 (매수 +, 매도 -)
    pub open_position: Quantity,
    /// 평균 진입가
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_entry_price: Option<Price>,
    /// 미체결 주문 (ID 기준)
    pub open_orders: HashMap<String, Order>,
    /// 거래소가 아직 ID를 부여하지 않은 활성 주문
    #[serde(default)]
    pub pending_orders: Vec<Order>,
    /// 종료된 주문 이력 (추가 전용)
    pub order_history: Vec<Order>,
}

impl Account {
    /// 빈 계좌를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 미체결 주문 ID 집합.
    pub fn open_order_ids(&self) -> HashSet<String> {
        self.open_orders.keys().cloned().collect()
    }

    /// ID로 미체결 주문을 조회합니다.
    pub fn open_order(&self, id: &str) -> Option<&Order> {
        self.open_orders.get(id)
    }

    /// ID 유무와 관계없이 활성 주문 수.
    pub fn open_order_count(&self) -> usize {
        self.open_orders.len() + self.pending_orders.len()
    }

    pub fn has_open_orders(&self) -> bool {
        self.open_order_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Side;
    use rust_decimal_macros::dec;

    #[test]
    fn test_open_order_count_includes_pending() {
        let mut account = Account::new();
        assert!(!account.has_open_orders());

        let resting = Order::limit(Side::Buy, dec!(1), dec!(100)).with_id("a");
        account.open_orders.insert(resting.id.clone(), resting);
        account
            .pending_orders
            .push(Order::limit(Side::Sell, dec!(1), dec!(200)));

        assert_eq!(account.open_order_count(), 2);
        assert_eq!(account.open_order_ids().len(), 1);
        assert!(account.has_open_orders());
    }
}
