//! 정밀한 금융 계산을 위한 Decimal 유틸리티.

use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 주문 수량을 위한 타입.
pub type Quantity = Decimal;

/// 호가/수량 단위 라운딩 방법.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundMethod {
    /// 일반 반올림
    Round,
    /// 내림 (매수 지정가에 보수적)
    Floor,
    /// 올림 (매도 지정가에 보수적)
    Ceil,
}

/// 값을 `step`의 배수로 라운딩합니다.
///
/// `step`이 0이면 값을 그대로 반환합니다.
pub fn round_to_step(value: Decimal, step: Decimal, method: RoundMethod) -> Decimal {
    if step.is_zero() {
        return value;
    }

    let steps = value / step;
    let rounded = match method {
        RoundMethod::Round => steps.round(),
        RoundMethod::Floor => steps.floor(),
        RoundMethod::Ceil => steps.ceil(),
    };

    rounded * step
}
