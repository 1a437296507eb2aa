//! 주문 없이 틱만 기록하는 모니터링 전략.

use crate::{Strategy, StrategyResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};
use trader_core::{Account, Bar, Instrument, Price, Quantity};
use trader_exchange::OrderRelay;

/// 모니터링 전략.
///
/// 세션 연결 상태와 데이터 흐름을 확인하는 용도로, 매 틱 바뀐 봉과 계좌
/// 요약을 로그로 남깁니다.
#[derive(Debug, Default)]
pub struct MonitorStrategy {
    relay: Option<OrderRelay>,
    unique_id: String,
    symbol: String,
    ticks: u64,
    last_close: Option<Price>,
    position: Quantity,
    open_orders: usize,
}

impl MonitorStrategy {
    /// 새 모니터링 전략 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 처리한 틱 수.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[async_trait]
impl Strategy for MonitorStrategy {
    fn name(&self) -> &str {
        "monitor"
    }

    fn prepare(&mut self, relay: OrderRelay) {
        self.relay = Some(relay);
    }

    fn reset(&mut self) {
        self.ticks = 0;
        self.last_close = None;
        self.position = Quantity::ZERO;
        self.open_orders = 0;
    }

    async fn init(
        &mut self,
        bars: &[Bar],
        account: &Account,
        instrument: &Instrument,
        unique_id: &str,
    ) -> StrategyResult<()> {
        self.unique_id = unique_id.to_string();
        self.symbol = instrument.symbol.clone();
        self.last_close = bars.first().map(|b| b.close);
        self.position = account.open_position;

        info!(
            id = %self.unique_id,
            symbol = %self.symbol,
            bars = bars.len(),
            position = %self.position,
            "Monitor strategy initialized"
        );
        Ok(())
    }

    async fn on_tick(&mut self, bars: &[Bar], account: &Account) -> StrategyResult<()> {
        self.ticks += 1;
        self.last_close = bars.first().map(|b| b.close);
        self.position = account.open_position;
        self.open_orders = account.open_order_count();

        let changed = bars.iter().filter(|b| b.changed).count();
        debug!(
            tick = self.ticks,
            changed,
            close = ?self.last_close,
            position = %self.position,
            open_orders = self.open_orders,
            equity = %account.equity,
            "Monitor tick"
        );
        Ok(())
    }

    fn get_state(&self) -> Value {
        json!({
            "id": self.unique_id,
            "symbol": self.symbol,
            "ticks": self.ticks,
            "last_close": self.last_close.map(|p| p.to_string()),
            "position": self.position.to_string(),
            "open_orders": self.open_orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_monitor_tracks_ticks() {
        let mut strategy = MonitorStrategy::new();
        let bar = Bar::flat(Utc::now(), dec!(1), dec!(2), dec!(1), dec!(2), dec!(5));
        let instrument = Instrument::new("btc", "usd", dec!(0.5));
        let mut account = Account::new();

        strategy.reset();
        strategy
            .init(&[bar.clone()], &account, &instrument, "bot-1")
            .await
            .unwrap();
        account.open_position = dec!(3);
        strategy.on_tick(&[bar], &account).await.unwrap();

        assert_eq!(strategy.ticks(), 1);
        let state = strategy.get_state();
        assert_eq!(state["symbol"], "BTCUSD");
        assert_eq!(state["position"], "3");
        assert_eq!(state["last_close"], "2");
    }
}
