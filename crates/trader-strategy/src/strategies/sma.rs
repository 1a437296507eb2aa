//! 단순 이동평균 크로스오버 전략.
//!
//! 마감된 봉의 종가로 단기/장기 이동평균을 계산하고, 골든 크로스에서 매수,
//! 데드 크로스에서 매도 시장가 주문을 냅니다. 진행 중인 헤드 봉은
//! 계산에서 제외합니다.

use crate::{Strategy, StrategyError, StrategyResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use trader_core::{Account, Bar, Instrument, Order, Quantity, Side};
use trader_exchange::OrderRelay;

/// SMA 크로스오버 전략 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmaCrossConfig {
    /// 단기 이동평균 기간
    #[serde(default = "default_short_period")]
    pub short_period: usize,

    /// 장기 이동평균 기간
    #[serde(default = "default_long_period")]
    pub long_period: usize,

    /// 진입 수량
    #[serde(default = "default_quantity")]
    pub quantity: Quantity,
}

fn default_short_period() -> usize {
    10
}

fn default_long_period() -> usize {
    20
}

fn default_quantity() -> Quantity {
    dec!(0.01)
}

impl Default for SmaCrossConfig {
    fn default() -> Self {
        Self {
            short_period: default_short_period(),
            long_period: default_long_period(),
            quantity: default_quantity(),
        }
    }
}

/// 최신 우선 봉 목록의 마감 봉(인덱스 1부터) 종가 평균.
fn closed_sma(bars: &[Bar], period: usize) -> Option<Decimal> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }
    let sum: Decimal = bars[1..=period].iter().map(|b| b.close).sum();
    Some(sum / Decimal::from(period))
}

/// 이전/현재 이동평균 쌍으로 크로스 방향을 판정합니다.
fn cross_signal(prev: (Decimal, Decimal), current: (Decimal, Decimal)) -> Option<Side> {
    let (prev_short, prev_long) = prev;
    let (short, long) = current;

    if prev_short <= prev_long && short > long {
        Some(Side::Buy)
    } else if prev_short >= prev_long && short < long {
        Some(Side::Sell)
    } else {
        None
    }
}

/// SMA 크로스오버 전략.
#[derive(Debug, Default)]
pub struct SmaCrossStrategy {
    config: SmaCrossConfig,
    relay: Option<OrderRelay>,
    /// 이전 (단기, 장기) SMA
    prev: Option<(Decimal, Decimal)>,
    /// 마지막으로 평가한 마감 봉
    last_closed: Option<DateTime<Utc>>,
    orders_sent: u64,
}

impl SmaCrossStrategy {
    /// 기본 설정으로 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정을 지정해 생성.
    pub fn with_config(config: SmaCrossConfig) -> Result<Self, StrategyError> {
        if config.short_period == 0 || config.short_period >= config.long_period {
            return Err(StrategyError::InvalidParameter(format!(
                "short_period ({}) must be positive and below long_period ({})",
                config.short_period, config.long_period
            )));
        }
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// `[strategy.params]` 값으로 생성. `null`이면 기본 설정.
    pub fn from_params(params: Value) -> Result<Self, StrategyError> {
        if params.is_null() {
            return Self::with_config(SmaCrossConfig::default());
        }
        let config: SmaCrossConfig = serde_json::from_value(params)
            .map_err(|e| StrategyError::InvalidParameter(e.to_string()))?;
        Self::with_config(config)
    }

    fn averages(&self, bars: &[Bar]) -> Option<(Decimal, Decimal)> {
        Some((
            closed_sma(bars, self.config.short_period)?,
            closed_sma(bars, self.config.long_period)?,
        ))
    }

    async fn enter(&mut self, side: Side, account: &Account) -> StrategyResult<()> {
        let relay = self
            .relay
            .as_ref()
            .ok_or_else(|| StrategyError::NotPrepared(self.name().to_string()))?;

        // 반대 포지션이 있으면 청산분까지 포함
        let opposing = (account.open_position * side.sign()).min(Decimal::ZERO).abs();
        let quantity = self.config.quantity + opposing;
        let id = relay.send_order(&Order::market(side, quantity)).await?;
        self.orders_sent += 1;

        info!(order_id = %id, side = %side, quantity = %quantity, "SMA cross order sent");
        Ok(())
    }
}

#[async_trait]
impl Strategy for SmaCrossStrategy {
    fn name(&self) -> &str {
        "sma_cross"
    }

    fn prepare(&mut self, relay: OrderRelay) {
        self.relay = Some(relay);
    }

    fn reset(&mut self) {
        self.prev = None;
        self.last_closed = None;
        self.orders_sent = 0;
    }

    async fn init(
        &mut self,
        bars: &[Bar],
        _account: &Account,
        instrument: &Instrument,
        unique_id: &str,
    ) -> StrategyResult<()> {
        self.prev = self.averages(bars);
        self.last_closed = bars.get(1).map(|b| b.open_time);

        info!(
            id = %unique_id,
            symbol = %instrument.symbol,
            short_period = self.config.short_period,
            long_period = self.config.long_period,
            "SMA cross strategy initialized"
        );
        Ok(())
    }

    async fn on_tick(&mut self, bars: &[Bar], account: &Account) -> StrategyResult<()> {
        let closed = bars.get(1).map(|b| b.open_time);
        if closed.is_none() || closed == self.last_closed {
            return Ok(());
        }
        self.last_closed = closed;

        let Some(current) = self.averages(bars) else {
            return Ok(());
        };
        let prev = self.prev.replace(current);

        // 이전 주문 결과가 반영될 때까지 대기
        if account.has_open_orders() {
            return Ok(());
        }

        match prev.and_then(|p| cross_signal(p, current)) {
            Some(Side::Buy) if account.open_position <= Decimal::ZERO => {
                self.enter(Side::Buy, account).await
            }
            Some(Side::Sell) if account.open_position >= Decimal::ZERO => {
                self.enter(Side::Sell, account).await
            }
            _ => Ok(()),
        }
    }

    fn get_state(&self) -> Value {
        json!({
            "short_period": self.config.short_period,
            "long_period": self.config.long_period,
            "quantity": self.config.quantity.to_string(),
            "short_sma": self.prev.map(|(s, _)| s.to_string()),
            "long_sma": self.prev.map(|(_, l)| l.to_string()),
            "orders_sent": self.orders_sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;
    use trader_core::Subbar;
    use trader_exchange::{SimulatedConfig, SimulatedExchange};

    fn bars_with_closes(closes: &[Decimal], newest: i64) -> Vec<Bar> {
        let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let time = base + Duration::minutes(newest - i as i64);
                Bar::flat(time, *c, *c, *c, *c, dec!(1))
            })
            .collect()
    }

    fn strategy() -> SmaCrossStrategy {
        SmaCrossStrategy::with_config(SmaCrossConfig {
            short_period: 2,
            long_period: 4,
            quantity: dec!(1),
        })
        .unwrap()
    }

    #[test]
    fn test_closed_sma_skips_head() {
        let bars = bars_with_closes(&[dec!(100), dec!(4), dec!(2), dec!(6)], 3);

        assert_eq!(closed_sma(&bars, 2), Some(dec!(3)));
        assert_eq!(closed_sma(&bars, 3), Some(dec!(4)));
        assert_eq!(closed_sma(&bars, 4), None);
    }

    #[test]
    fn test_cross_signal() {
        assert_eq!(cross_signal((dec!(1), dec!(1)), (dec!(2), dec!(1))), Some(Side::Buy));
        assert_eq!(cross_signal((dec!(2), dec!(1)), (dec!(1), dec!(2))), Some(Side::Sell));
        assert_eq!(cross_signal((dec!(2), dec!(1)), (dec!(3), dec!(1))), None);
    }

    #[test]
    fn test_invalid_periods_rejected() {
        let config = SmaCrossConfig {
            short_period: 5,
            long_period: 5,
            quantity: dec!(1),
        };
        assert!(SmaCrossStrategy::with_config(config).is_err());
    }

    #[test]
    fn test_from_params() {
        let strategy = SmaCrossStrategy::from_params(json!({"long_period": 30})).unwrap();
        assert_eq!(strategy.config.short_period, 10);
        assert_eq!(strategy.config.long_period, 30);

        let strategy = SmaCrossStrategy::from_params(Value::Null).unwrap();
        assert_eq!(strategy.config.quantity, dec!(0.01));

        assert!(SmaCrossStrategy::from_params(json!({"short_period": "fast"})).is_err());
    }

    #[tokio::test]
    async fn test_golden_cross_sends_buy() {
        let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let exchange = Arc::new(SimulatedExchange::with_subbars(
            SimulatedConfig::default(),
            vec![Subbar::new(base, dec!(20), dec!(20), dec!(20), dec!(20), dec!(1))],
        ));
        let instrument = Instrument::new("BTC", "USD", dec!(0.5));
        let account = Account::new();

        let mut strategy = strategy();
        strategy.prepare(OrderRelay::new(exchange.clone()));
        strategy.reset();

        let flat = bars_with_closes(&[dec!(10); 6], 5);
        strategy.init(&flat, &account, &instrument, "t").await.unwrap();

        // 같은 마감 봉이면 평가하지 않음
        strategy.on_tick(&flat, &account).await.unwrap();
        assert!(exchange.orders().await.is_empty());

        let rising = bars_with_closes(
            &[dec!(21), dec!(20), dec!(10), dec!(10), dec!(10), dec!(10)],
            6,
        );
        strategy.on_tick(&rising, &account).await.unwrap();

        let orders = exchange.orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Buy);
        assert_eq!(orders[0].executed_amount, dec!(1));
        assert_eq!(strategy.get_state()["orders_sent"], 1);
    }

    #[tokio::test]
    async fn test_unprepared_strategy_errors_on_signal() {
        let mut strategy = strategy();
        let account = Account::new();
        let instrument = Instrument::new("BTC", "USD", dec!(0.5));

        let flat = bars_with_closes(&[dec!(10); 6], 5);
        strategy.init(&flat, &account, &instrument, "t").await.unwrap();

        let falling = bars_with_closes(
            &[dec!(1), dec!(2), dec!(10), dec!(10), dec!(10), dec!(10)],
            6,
        );
        assert!(strategy.on_tick(&falling, &account).await.is_err());
    }
}
