//! 전략 크레이트 에러 타입.

use thiserror::Error;

/// 전략 생성 및 실행 에러.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// 등록되지 않은 전략 이름
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    /// `prepare` 전에 주문을 보내려 함
    #[error("Strategy {0} has no order relay")]
    NotPrepared(String),

    /// 잘못된 전략 파라미터
    #[error("Invalid strategy parameter: {0}")]
    InvalidParameter(String),
}
