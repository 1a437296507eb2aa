//! 트레이딩 시스템의 에러 타입.

use thiserror::Error;

/// 핵심 트레이딩 에러.
#[derive(Debug, Error)]
pub enum TraderError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 로깅 초기화 에러
    #[error("로깅 에러: {0}")]
    Logging(String),
}

/// 트레이딩 작업을 위한 Result 타입.
pub type TraderResult<T> = Result<T, TraderError>;

impl From<config::ConfigError> for TraderError {
    fn from(err: config::ConfigError) -> Self {
        TraderError::Config(err.to_string())
    }
}

impl From<std::io::Error> for TraderError {
    fn from(err: std::io::Error) -> Self {
        TraderError::Logging(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TraderError::Config("loop_interval_ms must be positive".to_string());
        assert_eq!(err.to_string(), "설정 에러: loop_interval_ms must be positive");
    }
}
