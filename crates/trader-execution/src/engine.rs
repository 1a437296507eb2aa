//! 라이브 트레이딩 엔진.
//!
//! 거래소에서 봉과 계좌를 주기적으로 가져와 로컬 상태를 맞추고, 전략에 틱을
//! 전달합니다. 모든 거래소 호출은 순서대로 대기하므로 틱은 겹치지 않습니다.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use trader_core::{Account, Bar, EngineSettings, Instrument, Quantity, TickSignal};
use trader_exchange::{Exchange, OrderRelay};
use trader_strategy::Strategy;

use crate::bar_store::BarStore;
use crate::error::{EngineError, EngineResult};
use crate::reconciler::{reconcile_orders, ReconcileReport};
use crate::scheduler::{EngineState, TickTrigger};

/// 엔진 누적 통계.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineStats {
    /// 완료된 틱 수
    pub ticks: u64,
    /// 이력에 기록된 체결 주문 수
    pub orders_filled: u64,
    /// 이력에 기록된 취소 주문 수
    pub orders_canceled: u64,
    /// 시작 시간
    pub started_at: Option<DateTime<Utc>>,
    /// 마지막 틱 완료 시간
    pub last_tick_at: Option<DateTime<Utc>>,
}

/// 라이브 트레이딩 엔진.
///
/// `start`로 초기화한 뒤 `run`으로 루프를 돌리고, 끝나면 `exit`를 호출합니다.
/// 정지 상태는 종료 상태이며 이후 거래소나 전략을 호출하지 않습니다.
pub struct LiveTradingEngine {
    settings: EngineSettings,
    exchange: Arc<dyn Exchange>,
    strategy: Box<dyn Strategy>,
    bars: BarStore,
    account: Account,
    instrument: Option<Instrument>,
    tick_signal: TickSignal,
    trigger: TickTrigger,
    state: EngineState,
    started: bool,
    shutdown: CancellationToken,
    stats: EngineStats,
}

impl LiveTradingEngine {
    /// 새 엔진을 생성합니다. `start` 전까지는 정지 상태입니다.
    pub fn new(
        settings: EngineSettings,
        exchange: Arc<dyn Exchange>,
        strategy: Box<dyn Strategy>,
    ) -> Self {
        let trigger = TickTrigger::new(settings.loop_interval(), settings.debounce());
        Self {
            settings,
            exchange,
            strategy,
            bars: BarStore::new(),
            account: Account::new(),
            instrument: None,
            tick_signal: TickSignal::new(),
            trigger,
            state: EngineState::Stopped,
            started: false,
            shutdown: CancellationToken::new(),
            stats: EngineStats::default(),
        }
    }

    /// 세션을 초기화합니다.
    ///
    /// 연결 확인, 상품 조회, 전체 봉 조회, 계좌 조회 후 전략을 초기화합니다.
    /// 하나라도 실패하면 정지 상태로 남습니다.
    pub async fn start(&mut self) -> EngineResult<()> {
        if self.started {
            return Err(EngineError::InvalidState(self.state));
        }
        self.started = true;

        match self.start_session().await {
            Ok(()) => {
                self.state = EngineState::Running;
                self.stats.started_at = Some(Utc::now());
                info!(id = %self.settings.id, bars = self.bars.len(), "Live trading engine started");
                Ok(())
            }
            Err(e) => {
                self.state = EngineState::Stopped;
                error!(id = %self.settings.id, error = %e, "Failed to start live trading engine");
                Err(e)
            }
        }
    }

    async fn start_session(&mut self) -> EngineResult<()> {
        self.exchange.subscribe_ticks(self.tick_signal.clone()).await;

        if !self.exchange.is_open().await {
            return Err(EngineError::NotConnected);
        }

        let instrument = self.exchange.get_instrument().await?;
        info!(
            symbol = %instrument.symbol,
            exchange = %self.exchange.name(),
            strategy = %self.strategy.name(),
            "Starting live trading engine"
        );

        self.strategy.prepare(OrderRelay::new(self.exchange.clone()));
        self.update_bars().await?;
        self.account = Account::new();
        self.update_account().await?;

        self.strategy.reset();
        self.strategy
            .init(self.bars.bars(), &self.account, &instrument, &self.settings.id)
            .await
            .map_err(EngineError::Strategy)?;
        self.instrument = Some(instrument);
        Ok(())
    }

    /// 정지되거나 취소될 때까지 스케줄링 루프를 실행합니다.
    ///
    /// 취소는 반복마다 한 번 확인하며 진행 중인 틱을 중단하지 않습니다.
    /// 틱 실패는 그대로 반환되고 상태는 바꾸지 않으므로 호출자가 `exit`로
    /// 정리해야 합니다. 실시간 연결이 끊기면 엔진을 정지하고
    /// `EngineError::ConnectionLost`를 반환합니다.
    pub async fn run(&mut self) -> EngineResult<()> {
        if self.state != EngineState::Running {
            return Err(EngineError::InvalidState(self.state));
        }
        info!(
            loop_interval_ms = self.settings.loop_interval_ms,
            poll_interval_ms = self.settings.poll_interval_ms,
            debounce_ms = self.settings.debounce_ms,
            "Engine loop started"
        );

        while self.state == EngineState::Running {
            if self.shutdown.is_cancelled() {
                info!("Engine loop shutdown requested");
                break;
            }

            let now = Utc::now().timestamp_millis();
            if self.trigger.should_fire(now, self.tick_signal.last_tick_ms()) {
                self.trigger.mark_run(now);

                if !self.check_connection().await {
                    error!("Realtime data connection unexpectedly closed");
                    self.exit().await;
                    return Err(EngineError::ConnectionLost);
                }
                self.handle_tick().await?;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.settings.poll_interval()) => {}
                _ = self.shutdown.cancelled() => {}
            }
        }

        info!(ticks = self.stats.ticks, "Engine loop stopped");
        Ok(())
    }

    /// 틱 하나를 실행합니다: 봉 갱신, 계좌 조정, 전략 호출, `changed` 초기화.
    pub async fn handle_tick(&mut self) -> EngineResult<()> {
        if self.state != EngineState::Running {
            return Err(EngineError::InvalidState(self.state));
        }

        match self.run_tick().await {
            Ok(report) => {
                self.stats.ticks += 1;
                self.stats.last_tick_at = Some(Utc::now());
                debug!(
                    tick = self.stats.ticks,
                    open_orders = report.open,
                    filled = report.filled,
                    canceled = report.canceled,
                    "Tick handled"
                );
                Ok(())
            }
            Err(e) => {
                error!(error = %e, tick = self.stats.ticks + 1, "Exception in handle_tick");
                Err(e)
            }
        }
    }

    async fn run_tick(&mut self) -> EngineResult<ReconcileReport> {
        self.update_bars().await?;
        let report = self.update_account().await?;
        self.strategy
            .on_tick(self.bars.bars(), &self.account)
            .await
            .map_err(EngineError::Strategy)?;
        self.bars.clear_changed();
        Ok(report)
    }

    /// 거래소에서 봉을 가져옵니다.
    ///
    /// 보유 봉이 부족하면 전체를 다시 조회하고, 아니면 최근 봉만 병합합니다.
    pub async fn update_bars(&mut self) -> EngineResult<()> {
        let minutes = self.settings.minutes_per_bar;

        if self.bars.needs_full_fetch() {
            let bars = self.exchange.get_bars(minutes, 0).await?;
            debug!(count = bars.len(), "Full bar fetch");
            self.bars.replace(bars);
        } else {
            let recent = self.exchange.recent_bars(minutes, 0).await?;
            self.bars.merge_incremental(recent);
        }
        Ok(())
    }

    /// 잔고를 갱신하고 주문 스냅샷으로 미체결/이력을 조정합니다.
    pub async fn update_account(&mut self) -> EngineResult<ReconcileReport> {
        self.exchange.update_account(&mut self.account).await?;
        let orders = self.exchange.get_orders().await?;

        let report = reconcile_orders(&mut self.account, orders);
        self.stats.orders_filled += report.filled as u64;
        self.stats.orders_canceled += report.canceled as u64;
        Ok(report)
    }

    /// 실시간 연결이 살아 있는지 확인합니다.
    pub async fn check_connection(&self) -> bool {
        self.exchange.is_open().await
    }

    /// 주문 전 점검: 시장이 열려 있는지 확인합니다.
    pub async fn sanity_check(&self) -> EngineResult<()> {
        self.exchange.check_market_open().await?;
        Ok(())
    }

    /// 현재 포지션과 미체결 주문 수를 로그로 남깁니다.
    pub async fn print_status(&self) -> EngineResult<Quantity> {
        let position = self.exchange.get_position().await?;
        info!(
            position = %position,
            open_orders = self.account.open_order_count(),
            "Current contract position"
        );
        Ok(position)
    }

    /// 세션을 종료합니다.
    ///
    /// 거래소 정리 실패는 로그만 남기고 삼킵니다. 실행 중이 아니면 아무것도 하지 않습니다.
    pub async fn exit(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        warn!("Shutting down. open orders are not touched! Close manually!");

        match self.exchange.exit().await {
            Ok(()) => {}
            Err(e) if e.is_auth_error() => {
                warn!(error = %e, "Was not authenticated; could not cancel orders");
            }
            Err(e) => {
                error!(error = %e, "Unable to exit exchange");
            }
        }

        self.state = EngineState::Stopped;
        self.shutdown.cancel();
        info!(
            ticks = self.stats.ticks,
            filled = self.stats.orders_filled,
            canceled = self.stats.orders_canceled,
            "Live trading engine stopped"
        );
    }

    /// 루프 취소용 토큰. 취소하면 다음 반복에서 루프가 끝납니다.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 거래소 푸시가 기록되는 틱 신호.
    pub fn tick_signal(&self) -> TickSignal {
        self.tick_signal.clone()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == EngineState::Running
    }

    /// 보유 봉 (최신 우선).
    pub fn bars(&self) -> &[Bar] {
        self.bars.bars()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn instrument(&self) -> Option<&Instrument> {
        self.instrument.as_ref()
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// 전략 상태 (모니터링용).
    pub fn strategy_state(&self) -> Value {
        self.strategy.get_state()
    }
}
