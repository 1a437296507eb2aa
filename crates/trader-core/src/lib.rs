//! # Trader Core
//!
//! 라이브 트레이딩 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 봉(Bar)과 서브바(Subbar)
//! - 주문 및 계좌 상태
//! - 거래 상품 메타데이터
//! - 실시간 푸시 타임스탬프 (`TickSignal`)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
