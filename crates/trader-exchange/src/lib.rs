//! 거래소 게이트웨이 추상화.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Exchange trait: 엔진이 의존하는 통합 거래소 인터페이스
//! - OrderRelay: 전략의 주문 요청을 거래소로 전달하는 핸들
//! - 시뮬레이션 거래소 (모의투자 및 테스트용)

pub mod error;
pub mod relay;
pub mod simulated;
pub mod traits;

pub use error::*;
pub use relay::OrderRelay;
pub use simulated::{RandomWalkFeed, SimulatedConfig, SimulatedExchange};
pub use traits::*;
