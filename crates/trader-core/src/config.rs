//! 설정 관리.
//!
//! 이 모듈은 라이브 트레이딩 세션의 설정을 정의하고 로드합니다.
//! 우선순위: 기본값 < 설정 파일(TOML) < `TRADER__` 환경 변수.

use crate::error::{TraderError, TraderResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 엔진 설정
    pub engine: EngineSettings,
    /// 거래소 설정
    pub exchange: ExchangeSettings,
    /// 전략 설정
    pub strategy: StrategySettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 엔진 스케줄링 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// 세션 식별자 (전략 고유 ID로도 사용)
    pub id: String,
    /// 봉 하나의 분 단위 폭
    pub minutes_per_bar: u32,
    /// 주기적 틱 간격 (밀리초)
    pub loop_interval_ms: u64,
    /// 루프 폴링 간격 (밀리초)
    pub poll_interval_ms: u64,
    /// 푸시 알림 이후 대기 시간 (밀리초)
    pub debounce_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            id: "live".to_string(),
            minutes_per_bar: 60,
            loop_interval_ms: 60_000,
            poll_interval_ms: 500,
            debounce_ms: 2_000,
        }
    }
}

impl EngineSettings {
    /// 주기적 틱 간격.
    pub fn loop_interval(&self) -> Duration {
        Duration::from_millis(self.loop_interval_ms)
    }

    /// 루프 폴링 간격.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 푸시 디바운스 간격.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// 거래소 선택 및 시뮬레이션 거래소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExchangeSettings {
    /// 거래소 이름
    pub name: String,
    /// 기준 자산
    pub base: String,
    /// 호가 자산
    pub quote: String,
    /// 시뮬레이션 시작 가격
    pub start_price: Decimal,
    /// 시뮬레이션 호가 단위
    pub tick_size: Decimal,
    /// 시뮬레이션 서브바 생성 간격 (밀리초)
    pub feed_interval_ms: u64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            name: "simulated".to_string(),
            base: "BTC".to_string(),
            quote: "USD".to_string(),
            start_price: Decimal::new(50_000, 0),
            tick_size: Decimal::new(5, 1),
            feed_interval_ms: 1_000,
        }
    }
}

/// 전략 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StrategySettings {
    /// 전략 이름 (팩토리 키)
    pub name: String,
    /// 전략별 파라미터 (`[strategy.params]`)
    pub params: Value,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            name: "monitor".to_string(),
            params: Value::Object(Default::default()),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 콘솔 출력 여부
    pub to_console: bool,
    /// 로그 파일 경로
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            to_console: true,
            file: None,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> TraderResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TRADER")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 설정 값의 일관성을 검증합니다.
    pub fn validate(&self) -> TraderResult<()> {
        let engine = &self.engine;

        if engine.id.trim().is_empty() {
            return Err(TraderError::Config("engine.id must not be empty".to_string()));
        }
        if engine.minutes_per_bar == 0 {
            return Err(TraderError::Config(
                "engine.minutes_per_bar must be positive".to_string(),
            ));
        }
        if engine.loop_interval_ms == 0 || engine.poll_interval_ms == 0 {
            return Err(TraderError::Config(
                "engine.loop_interval_ms and engine.poll_interval_ms must be positive".to_string(),
            ));
        }
        if engine.poll_interval_ms > engine.loop_interval_ms {
            return Err(TraderError::Config(format!(
                "engine.poll_interval_ms ({}) exceeds engine.loop_interval_ms ({})",
                engine.poll_interval_ms, engine.loop_interval_ms
            )));
        }
        if self.exchange.name.trim().is_empty() {
            return Err(TraderError::Config("exchange.name must not be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.engine.debounce(), Duration::from_secs(2));
    }

    #[test]
    fn test_validate_rejects_poll_longer_than_loop() {
        let mut config = AppConfig::default();
        config.engine.loop_interval_ms = 100;
        config.engine.poll_interval_ms = 500;

        assert!(matches!(config.validate(), Err(TraderError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_bar_width() {
        let mut config = AppConfig::default();
        config.engine.minutes_per_bar = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("trader-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[engine]\nid = \"bot-1\"\nminutes_per_bar = 240\n\n[strategy]\nname = \"sma_cross\"\n\n[strategy.params]\nshort_period = 5\nquantity = \"0.02\""
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.engine.id, "bot-1");
        assert_eq!(config.engine.minutes_per_bar, 240);
        // 파일에 없는 값은 기본값 유지
        assert_eq!(config.engine.debounce_ms, 2_000);
        assert_eq!(config.exchange.name, "simulated");
        assert_eq!(config.strategy.name, "sma_cross");
        assert_eq!(config.strategy.params["short_period"], 5);
        assert_eq!(config.strategy.params["quantity"], "0.02");
    }
}
