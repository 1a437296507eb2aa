//! 라이브 트레이딩 엔진.
//!
//! 이 crate는 다음을 제공합니다:
//! - 시간 버킷 봉 저장소와 부분 조회 병합
//! - 주문 스냅샷 기반 계좌 조정
//! - 주기 실행과 푸시 디바운스를 결합한 틱 트리거
//! - 시작, 루프, 틱, 종료를 관리하는 엔진
//!
//! # 예제
//!
//! ```rust,ignore
//! use trader_execution::LiveTradingEngine;
//!
//! let mut engine = LiveTradingEngine::new(settings, exchange, strategy);
//! engine.start().await?;
//! let result = engine.run().await;
//! engine.exit().await;
//! ```

pub mod bar_store;
pub mod engine;
pub mod error;
pub mod reconciler;
pub mod scheduler;

// 주요 타입 재내보내기
pub use bar_store::{BarStore, MergeOutcome, MIN_BARS};
pub use engine::{EngineStats, LiveTradingEngine};
pub use error::{EngineError, EngineResult};
pub use reconciler::{reconcile_orders, ReconcileReport};
pub use scheduler::{EngineState, TickTrigger};
