//! 시뮬레이션 거래소 구현.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use trader_core::{
    Account, Bar, ExchangeSettings, Instrument, Order, OrderType, Price, Quantity, Side, Subbar,
    TickSignal,
};
use uuid::Uuid;

use super::feed::RandomWalkFeed;
use crate::traits::{Exchange, ExchangeResult};
use crate::ExchangeError;

/// 시뮬레이션 거래소 설정.
#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    /// 기준 자산
    pub base: String,
    /// 호가 자산
    pub quote: String,
    /// 시작 가격
    pub start_price: Price,
    /// 호가 단위
    pub tick_size: Price,
    /// 초기 호가 자산 잔고
    pub initial_balance: Decimal,
    /// 생성 시 미리 만들어 둘 1분 서브바 수
    pub history_minutes: usize,
    /// `recent_bars`가 다루는 최근 서브바 수
    pub recent_window: usize,
    /// 랜덤 워크 시드
    pub seed: u64,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            base: "BTC".to_string(),
            quote: "USD".to_string(),
            start_price: dec!(50000),
            tick_size: dec!(0.5),
            initial_balance: dec!(10000),
            history_minutes: 24 * 60,
            recent_window: 90,
            seed: 42,
        }
    }
}

impl SimulatedConfig {
    /// 세션 설정에서 생성합니다.
    pub fn from_settings(settings: &ExchangeSettings) -> Self {
        Self {
            base: settings.base.clone(),
            quote: settings.quote.clone(),
            start_price: settings.start_price,
            tick_size: settings.tick_size,
            ..Default::default()
        }
    }

    /// 미리 생성할 서브바 수를 설정합니다.
    pub fn with_history_minutes(mut self, minutes: usize) -> Self {
        self.history_minutes = minutes;
        self
    }

    /// 증분 조회 범위를 설정합니다.
    pub fn with_recent_window(mut self, subbars: usize) -> Self {
        self.recent_window = subbars;
        self
    }

    /// 랜덤 워크 시드를 설정합니다.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// 내부 거래소 상태.
#[derive(Debug)]
struct VenueState {
    /// 1분 서브바 (시간 오름차순)
    subbars: Vec<Subbar>,
    feed: RandomWalkFeed,
    /// 활성 주문과 아직 `get_orders`로 보고되지 않은 종료 주문
    orders: Vec<Order>,
    balance: Decimal,
    position: Quantity,
    average_entry_price: Option<Price>,
    connected: bool,
    market_open: bool,
    /// `exit` 시 인증 실패를 흉내냅니다
    reject_exit_auth: bool,
    /// `exit` 시 네트워크 실패를 흉내냅니다
    fail_exit: bool,
    tick_signal: Option<TickSignal>,
    calls: HashMap<&'static str, usize>,
}

impl VenueState {
    fn record(&mut self, method: &'static str) {
        *self.calls.entry(method).or_insert(0) += 1;
    }

    fn ensure_connected(&self) -> ExchangeResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(ExchangeError::Disconnected(
                "realtime connection closed".to_string(),
            ))
        }
    }

    fn last_price(&self) -> Option<Price> {
        self.subbars.last().map(|s| s.close)
    }

    fn append_subbar(&mut self, subbar: Subbar) -> bool {
        if let Some(last) = self.subbars.last() {
            if subbar.open_time <= last.open_time {
                return false;
            }
        }

        self.feed.set_last_close(subbar.close);
        self.match_resting_orders(&subbar);
        self.subbars.push(subbar);
        if let Some(signal) = &self.tick_signal {
            signal.notify();
        }
        true
    }

    /// 새 서브바에 의해 가격이 교차된 대기 주문을 체결합니다.
    fn match_resting_orders(&mut self, subbar: &Subbar) {
        let fills: Vec<(usize, Price)> = self
            .orders
            .iter()
            .enumerate()
            .filter(|(_, order)| order.active)
            .filter_map(|(idx, order)| crossing_price(order, subbar).map(|price| (idx, price)))
            .collect();

        for (idx, price) in fills {
            self.fill(idx, price);
        }
    }

    fn fill(&mut self, idx: usize, price: Price) {
        let order = &mut self.orders[idx];
        let quantity = order.remaining_quantity();
        let delta = order.side.sign() * quantity;

        order.executed_amount = order.quantity;
        order.executed_price = Some(price);
        order.active = false;
        debug!(order_id = %order.id, price = %price, "Simulated fill");

        self.balance -= delta * price;
        self.apply_position(delta, price);
    }

    fn apply_position(&mut self, delta: Quantity, price: Price) {
        let old = self.position;
        let new = old + delta;

        self.average_entry_price = if new.is_zero() {
            None
        } else if old.is_zero() || old.is_sign_negative() != new.is_sign_negative() {
            Some(price)
        } else if new.abs() > old.abs() {
            let prev = self.average_entry_price.unwrap_or(price);
            Some((prev * old.abs() + price * delta.abs()) / new.abs())
        } else {
            self.average_entry_price
        };
        self.position = new;
    }

    fn order_index(&self, order_id: &str) -> ExchangeResult<usize> {
        self.orders
            .iter()
            .position(|o| o.id == order_id && o.active)
            .ok_or_else(|| ExchangeError::OrderNotFound(order_id.to_string()))
    }
}

/// 대기 주문이 서브바에 의해 체결될 가격. 교차하지 않으면 `None`.
fn crossing_price(order: &Order, subbar: &Subbar) -> Option<Price> {
    match (order.order_type, order.side) {
        (OrderType::Limit, Side::Buy) => order.limit_price.filter(|p| subbar.low <= *p),
        (OrderType::Limit, Side::Sell) => order.limit_price.filter(|p| subbar.high >= *p),
        (OrderType::Stop | OrderType::StopLimit, side) => {
            let stop = order.stop_price?;
            let triggered = match side {
                Side::Buy => subbar.high >= stop,
                Side::Sell => subbar.low <= stop,
            };
            triggered.then(|| order.limit_price.unwrap_or(stop))
        }
        (OrderType::Market, _) => Some(subbar.open),
    }
}

/// 1분 서브바를 `minutes` 폭의 버킷으로 묶습니다 (최신 우선).
fn aggregate(subbars: &[Subbar], minutes: u32, offset_minutes: u32) -> Vec<Bar> {
    let offset = Duration::minutes(i64::from(offset_minutes));
    let mut bars: Vec<Bar> = Vec::new();

    for subbar in subbars {
        let key = Bar::bucket_start(subbar.open_time - offset, minutes) + offset;
        match bars.last_mut() {
            Some(bar) if bar.open_time == key => {
                bar.push_subbar(subbar.clone());
            }
            _ => bars.push(Bar::from_subbars(key, vec![subbar.clone()])),
        }
    }

    bars.reverse();
    bars
}

fn floor_to_minute(time: DateTime<Utc>) -> DateTime<Utc> {
    Bar::bucket_start(time, 1)
}

/// 메모리 기반 시뮬레이션 거래소.
///
/// 1분 서브바로부터 봉을 만들고, 주문 ID를 부여하며, 새 서브바가 가격을
/// 교차하면 대기 주문을 체결합니다. 연결 끊김, 시장 휴장, 종료 시 인증 실패를
/// 흉내낼 수 있고, 테스트를 위해 게이트웨이 호출 횟수를 기록합니다.
#[derive(Debug, Clone)]
pub struct SimulatedExchange {
    config: SimulatedConfig,
    state: Arc<RwLock<VenueState>>,
}

impl SimulatedExchange {
    /// 랜덤 워크 이력으로 거래소를 생성합니다.
    pub fn new(config: SimulatedConfig) -> Self {
        let mut feed = RandomWalkFeed::new(config.start_price, config.tick_size, config.seed);
        let start = floor_to_minute(Utc::now())
            - Duration::minutes(config.history_minutes as i64);
        let subbars = feed.generate(start, config.history_minutes);

        Self::from_parts(config, feed, subbars)
    }

    /// 주어진 서브바 이력으로 거래소를 생성합니다.
    pub fn with_subbars(config: SimulatedConfig, mut subbars: Vec<Subbar>) -> Self {
        subbars.sort_by_key(|s| s.open_time);
        subbars.dedup_by_key(|s| s.open_time);

        let mut feed = RandomWalkFeed::new(config.start_price, config.tick_size, config.seed);
        if let Some(last) = subbars.last() {
            feed.set_last_close(last.close);
        }

        Self::from_parts(config, feed, subbars)
    }

    fn from_parts(config: SimulatedConfig, feed: RandomWalkFeed, subbars: Vec<Subbar>) -> Self {
        let state = VenueState {
            subbars,
            feed,
            orders: Vec::new(),
            balance: config.initial_balance,
            position: Decimal::ZERO,
            average_entry_price: None,
            connected: true,
            market_open: true,
            reject_exit_auth: false,
            fail_exit: false,
            tick_signal: None,
            calls: HashMap::new(),
        };

        Self {
            config,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// 새 서브바를 추가합니다. 마지막 서브바보다 최신이 아니면 무시됩니다.
    ///
    /// 추가되면 대기 주문을 매칭하고 등록된 틱 신호에 알립니다.
    pub async fn push_subbar(&self, subbar: Subbar) -> bool {
        self.state.write().await.append_subbar(subbar)
    }

    /// 랜덤 워크로 `count`개의 서브바를 진행합니다.
    pub async fn advance(&self, count: usize) {
        let mut state = self.state.write().await;
        for _ in 0..count {
            let next_time = state
                .subbars
                .last()
                .map(|s| s.open_time + Duration::minutes(1))
                .unwrap_or_else(|| floor_to_minute(Utc::now()));
            let subbar = state.feed.next_subbar(next_time);
            state.append_subbar(subbar);
        }
    }

    /// 실시간 연결 상태를 설정합니다.
    pub async fn set_connected(&self, connected: bool) {
        self.state.write().await.connected = connected;
    }

    /// 시장 개장 여부를 설정합니다.
    pub async fn set_market_open(&self, open: bool) {
        self.state.write().await.market_open = open;
    }

    /// `exit` 호출이 인증 에러로 실패하도록 설정합니다.
    pub async fn set_reject_exit_auth(&self, reject: bool) {
        self.state.write().await.reject_exit_auth = reject;
    }

    /// `exit` 호출이 네트워크 에러로 실패하도록 설정합니다.
    pub async fn set_fail_exit(&self, fail: bool) {
        self.state.write().await.fail_exit = fail;
    }

    /// 대기 주문을 지정 가격에 전량 체결합니다.
    pub async fn fill_order(&self, order_id: &str, price: Price) -> ExchangeResult<()> {
        let mut state = self.state.write().await;
        let idx = state.order_index(order_id)?;
        state.fill(idx, price);
        Ok(())
    }

    /// 거래소에 남아 있는 주문 (보고 전의 종료 주문 포함).
    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    /// 누적 서브바 수.
    pub async fn subbar_count(&self) -> usize {
        self.state.read().await.subbars.len()
    }

    /// 전체 게이트웨이 호출 횟수.
    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls.values().sum()
    }

    /// 특정 메서드의 호출 횟수.
    pub async fn calls_to(&self, method: &str) -> usize {
        self.state
            .read()
            .await
            .calls
            .get(method)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl Exchange for SimulatedExchange {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn is_open(&self) -> bool {
        let mut state = self.state.write().await;
        state.record("is_open");
        state.connected
    }

    async fn subscribe_ticks(&self, signal: TickSignal) {
        let mut state = self.state.write().await;
        state.record("subscribe_ticks");
        state.tick_signal = Some(signal);
    }

    async fn get_instrument(&self) -> ExchangeResult<Instrument> {
        let mut state = self.state.write().await;
        state.record("get_instrument");
        state.ensure_connected()?;
        Ok(Instrument::new(
            &self.config.base,
            &self.config.quote,
            self.config.tick_size,
        ))
    }

    async fn get_bars(
        &self,
        minutes_per_bar: u32,
        start_offset_minutes: u32,
    ) -> ExchangeResult<Vec<Bar>> {
        let mut state = self.state.write().await;
        state.record("get_bars");
        state.ensure_connected()?;
        Ok(aggregate(&state.subbars, minutes_per_bar, start_offset_minutes))
    }

    async fn recent_bars(
        &self,
        minutes_per_bar: u32,
        start_offset_minutes: u32,
    ) -> ExchangeResult<Vec<Bar>> {
        let mut state = self.state.write().await;
        state.record("recent_bars");
        state.ensure_connected()?;
        let from = state.subbars.len().saturating_sub(self.config.recent_window);
        Ok(aggregate(
            &state.subbars[from..],
            minutes_per_bar,
            start_offset_minutes,
        ))
    }

    async fn update_account(&self, account: &mut Account) -> ExchangeResult<()> {
        let mut state = self.state.write().await;
        state.record("update_account");
        state.ensure_connected()?;

        let mark = state.last_price().unwrap_or(self.config.start_price);
        account.available_balance = state.balance;
        account.equity = state.balance + state.position * mark;
        account.open_position = state.position;
        account.average_entry_price = state.average_entry_price;
        Ok(())
    }

    async fn get_orders(&self) -> ExchangeResult<Vec<Order>> {
        let mut state = self.state.write().await;
        state.record("get_orders");
        state.ensure_connected()?;

        // 종료된 주문은 한 번만 보고
        let snapshot = state.orders.clone();
        state.orders.retain(|o| o.active);
        Ok(snapshot)
    }

    async fn get_position(&self) -> ExchangeResult<Quantity> {
        let mut state = self.state.write().await;
        state.record("get_position");
        state.ensure_connected()?;
        Ok(state.position)
    }

    async fn send_order(&self, order: &Order) -> ExchangeResult<String> {
        let mut state = self.state.write().await;
        state.record("send_order");
        state.ensure_connected()?;

        if !state.market_open {
            return Err(ExchangeError::MarketClosed(self.config.base.clone()));
        }
        if order.quantity <= Decimal::ZERO {
            return Err(ExchangeError::OrderRejected(format!(
                "invalid quantity {}",
                order.quantity
            )));
        }

        let market_price = match order.order_type {
            OrderType::Market => Some(state.last_price().ok_or_else(|| {
                ExchangeError::OrderRejected("no market price yet".to_string())
            })?),
            _ => None,
        };

        let id = format!("sim-{}", Uuid::new_v4());
        let mut placed = order.clone().with_id(&id);
        placed.active = true;
        placed.executed_amount = Decimal::ZERO;
        placed.executed_price = None;
        placed.created_at = Utc::now();
        state.orders.push(placed);

        if let Some(price) = market_price {
            let idx = state.orders.len() - 1;
            state.fill(idx, price);
        }

        debug!(order_id = %id, side = %order.side, "Simulated order accepted");
        Ok(id)
    }

    async fn update_order(&self, order: &Order) -> ExchangeResult<()> {
        let mut state = self.state.write().await;
        state.record("update_order");
        state.ensure_connected()?;

        let idx = state.order_index(&order.id)?;
        let resting = &mut state.orders[idx];
        resting.quantity = order.quantity;
        resting.limit_price = order.limit_price;
        resting.stop_price = order.stop_price;
        Ok(())
    }

    async fn cancel_order(&self, order_id: &str) -> ExchangeResult<()> {
        let mut state = self.state.write().await;
        state.record("cancel_order");
        state.ensure_connected()?;

        let idx = state.order_index(order_id)?;
        state.orders[idx].active = false;
        Ok(())
    }

    async fn check_market_open(&self) -> ExchangeResult<()> {
        let mut state = self.state.write().await;
        state.record("check_market_open");
        if state.market_open {
            Ok(())
        } else {
            Err(ExchangeError::MarketClosed(format!(
                "{}{}",
                self.config.base, self.config.quote
            )))
        }
    }

    async fn exit(&self) -> ExchangeResult<()> {
        let mut state = self.state.write().await;
        state.record("exit");

        if state.reject_exit_auth {
            return Err(ExchangeError::Unauthorized(
                "api key rejected".to_string(),
            ));
        }
        if state.fail_exit {
            return Err(ExchangeError::NetworkError(
                "cancel-all request failed".to_string(),
            ));
        }

        let mut canceled = 0;
        for order in state.orders.iter_mut().filter(|o| o.active) {
            order.active = false;
            canceled += 1;
        }
        state.connected = false;
        info!(canceled, "Simulated exchange closed");
        Ok(())
    }
}
