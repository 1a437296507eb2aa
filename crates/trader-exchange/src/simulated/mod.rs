//! 모의투자 및 테스트를 위한 시뮬레이션 거래소.
//!
//! 1분 서브바(랜덤 워크 또는 스크립트)로부터 봉을 만들고, 증분 조회에는 최근
//! 서브바 일부만 돌려주어 병합 경로가 실제로 쓰이도록 합니다.
//!
//! # 예제
//!
//! ```ignore
//! use trader_exchange::simulated::{SimulatedConfig, SimulatedExchange};
//!
//! let exchange = SimulatedExchange::new(SimulatedConfig::default().with_seed(7));
//! exchange.advance(5).await;
//! let bars = exchange.get_bars(60, 0).await?;
//! ```

mod exchange;
mod feed;

pub use exchange::{SimulatedConfig, SimulatedExchange};
pub use feed::RandomWalkFeed;
