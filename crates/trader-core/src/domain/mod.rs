//! 트레이딩 운영을 위한 도메인 모델.

mod account;
mod bar;
mod instrument;
mod order;
mod tick;

pub use account::*;
pub use bar::*;
pub use instrument::*;
pub use order::*;
pub use tick::*;
