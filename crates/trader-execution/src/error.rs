//! 엔진 에러 타입.

use thiserror::Error;
use trader_exchange::ExchangeError;

use crate::scheduler::EngineState;

/// 라이브 엔진 에러.
#[derive(Debug, Error)]
pub enum EngineError {
    /// 거래소 호출 실패
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// 전략 콜백 실패
    #[error("Strategy error: {0}")]
    Strategy(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 시작 시 실시간 연결이 열려 있지 않음
    #[error("Exchange connection is not open")]
    NotConnected,

    /// 실행 중 실시간 연결이 끊김
    #[error("Realtime data connection unexpectedly closed")]
    ConnectionLost,

    /// 현재 상태에서 허용되지 않는 작업
    #[error("Invalid engine state: {0}")]
    InvalidState(EngineState),
}

/// 엔진 작업 Result 타입.
pub type EngineResult<T> = Result<T, EngineError>;
