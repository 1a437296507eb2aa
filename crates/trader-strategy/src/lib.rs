//! 트레이딩 전략 인터페이스와 내장 전략.
//!
//! 이 크레이트가 제공하는 기능:
//! - 라이브 엔진이 호출하는 Strategy trait
//! - 내장 전략 (모니터, 이동평균 크로스)
//! - 이름 기반 전략 팩토리
//!
//! # 예제
//!
//! ```rust,ignore
//! use trader_strategy::create_strategy;
//!
//! let mut strategy = create_strategy("sma_cross", json!({ "short_period": 5 }))?;
//! strategy.prepare(relay);
//! strategy.reset();
//! strategy.init(&bars, &account, &instrument, "live").await?;
//! ```

pub mod error;
pub mod registry;
pub mod strategies;
pub mod traits;

// 주요 타입 재내보내기
pub use error::StrategyError;
pub use registry::{create_strategy, StrategyMeta, StrategyRegistry};
pub use strategies::{MonitorStrategy, SmaCrossConfig, SmaCrossStrategy};
pub use traits::{Strategy, StrategyResult};
