//! 내장 전략.

mod monitor;
mod sma;

pub use monitor::MonitorStrategy;
pub use sma::{SmaCrossConfig, SmaCrossStrategy};
