//! 거래 상품 메타데이터.

use crate::types::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 세션 시작 시 한 번 조회되는 상품 정보. 이후 읽기 전용입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// 거래소 심볼 (예: "XBTUSD", "BTCUSDT")
    pub symbol: String,
    /// 기준 자산
    pub base: String,
    /// 호가 자산
    pub quote: String,
    /// 호가 단위
    pub tick_size: Price,
    /// 최소 수량 단위
    pub lot_size: Quantity,
    /// 계약 승수
    pub contract_value: Decimal,
    /// 인버스 계약 여부
    #[serde(default)]
    pub is_inverse: bool,
}

impl Instrument {
    /// 새 상품 정보를 생성합니다.
    pub fn new(base: impl Into<String>, quote: impl Into<String>, tick_size: Price) -> Self {
        let base = base.into().to_uppercase();
        let quote = quote.into().to_uppercase();
        Self {
            symbol: format!("{}{}", base, quote),
            base,
            quote,
            tick_size,
            lot_size: Decimal::ONE,
            contract_value: Decimal::ONE,
            is_inverse: false,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
