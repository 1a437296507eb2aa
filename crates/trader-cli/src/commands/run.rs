//! 라이브 트레이딩 세션 실행 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 기본 설정으로 시뮬레이션 거래소에서 실행
//! trader run
//!
//! # 전략과 세션 ID 지정
//! trader -c config/default.toml run --strategy sma_cross --id bot-1
//! ```

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use trader_core::{AppConfig, ExchangeSettings, TraderError};
use trader_exchange::{SimulatedConfig, SimulatedExchange};
use trader_execution::LiveTradingEngine;
use trader_strategy::create_strategy;

/// 설정의 거래소 이름으로 거래소를 생성합니다.
///
/// 현재 내장 거래소는 시뮬레이션 거래소뿐입니다.
pub fn build_exchange(settings: &ExchangeSettings) -> Result<Arc<SimulatedExchange>, TraderError> {
    match settings.name.trim().to_lowercase().as_str() {
        "simulated" | "sim" | "paper" => Ok(Arc::new(SimulatedExchange::new(
            SimulatedConfig::from_settings(settings),
        ))),
        other => Err(TraderError::Config(format!(
            "Unsupported exchange: {} (available: simulated)",
            other
        ))),
    }
}

/// 시뮬레이션 거래소에 주기적으로 1분 서브바를 공급합니다.
fn spawn_feed(
    exchange: Arc<SimulatedExchange>,
    interval: Duration,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => exchange.advance(1).await,
                _ = shutdown.cancelled() => break,
            }
        }
    })
}

/// 공급 태스크 종료를 기다립니다. 패닉이나 중단은 경고로 남기고 `false`를 반환합니다.
async fn join_feed(feed: tokio::task::JoinHandle<()>) -> bool {
    match feed.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, panicked = e.is_panic(), "Simulated feed task did not finish cleanly");
            false
        }
    }
}

/// 라이브 세션을 실행합니다. Ctrl-C 또는 치명적 에러까지 대기합니다.
pub async fn run_live(config: AppConfig) -> Result<()> {
    let exchange = build_exchange(&config.exchange)?;
    let strategy = create_strategy(&config.strategy.name, config.strategy.params.clone())?;

    let mut engine = LiveTradingEngine::new(config.engine.clone(), exchange.clone(), strategy);
    engine
        .start()
        .await
        .context("Live trading engine failed to start")?;

    if let Err(e) = engine.sanity_check().await {
        warn!(error = %e, "Sanity check failed");
    }
    engine.print_status().await?;

    let shutdown = engine.shutdown_token();
    let feed = spawn_feed(
        exchange,
        Duration::from_millis(config.exchange.feed_interval_ms.max(1)),
        shutdown.clone(),
    );

    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down...");
            ctrl_c_token.cancel();
        }
    });

    let result = engine.run().await;
    if let Err(e) = &result {
        error!(error = %e, "Live session ended with error");
    }

    engine.exit().await;
    shutdown.cancel();
    join_feed(feed).await;

    let stats = engine.stats();
    info!(
        ticks = stats.ticks,
        filled = stats.orders_filled,
        canceled = stats.orders_canceled,
        strategy_state = %engine.strategy_state(),
        "Session finished"
    );

    result.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_exchange_rejects_unknown_venue() {
        let settings = ExchangeSettings {
            name: "bitmex".to_string(),
            ..Default::default()
        };
        assert!(matches!(build_exchange(&settings), Err(TraderError::Config(_))));
    }

    #[tokio::test]
    async fn test_feed_stops_on_cancel() {
        let exchange = build_exchange(&ExchangeSettings::default()).unwrap();
        let before = exchange.subbar_count().await;
        let shutdown = CancellationToken::new();
        let feed = spawn_feed(exchange.clone(), Duration::from_millis(5), shutdown.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();

        assert!(join_feed(feed).await);
        assert!(exchange.subbar_count().await > before);
    }

    #[tokio::test]
    async fn test_join_feed_reports_panic() {
        let feed: tokio::task::JoinHandle<()> = tokio::spawn(async { panic!("feed crashed") });
        assert!(!join_feed(feed).await);
    }

    #[test]
    fn test_build_exchange_simulated() {
        let settings = ExchangeSettings {
            name: " Paper ".to_string(),
            ..Default::default()
        };
        assert!(build_exchange(&settings).is_ok());
    }
}
