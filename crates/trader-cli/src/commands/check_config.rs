//! 설정 검증 명령어.

use anyhow::Result;
use trader_core::AppConfig;
use trader_strategy::{create_strategy, StrategyRegistry};

/// 로드된 설정을 요약하고 전략 이름을 확인합니다.
pub fn check_config(config: &AppConfig) -> Result<()> {
    config.validate()?;

    if StrategyRegistry::find(&config.strategy.name).is_none() {
        anyhow::bail!(
            "Unknown strategy: {} (available: {})",
            config.strategy.name,
            StrategyRegistry::list_ids().join(", ")
        );
    }
    create_strategy(&config.strategy.name, config.strategy.params.clone())?;
    crate::commands::run::build_exchange(&config.exchange)?;

    println!("{}", serde_json::to_string_pretty(config)?);
    println!("\n설정이 유효합니다.");
    Ok(())
}

/// 내장 전략 목록을 출력합니다.
pub fn print_strategies() {
    println!("사용 가능한 전략:");
    for meta in StrategyRegistry::all() {
        println!("  {:<12} {}", meta.id, meta.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_strategy_rejected() {
        let mut config = AppConfig::default();
        config.strategy.name = "martingale".to_string();

        assert!(check_config(&config).is_err());
    }

    #[test]
    fn test_invalid_strategy_params_rejected() {
        let mut config = AppConfig::default();
        config.strategy.name = "sma_cross".to_string();
        config.strategy.params = serde_json::json!({"short_period": 20, "long_period": 10});

        assert!(check_config(&config).is_err());
    }

    #[test]
    fn test_default_config_passes() {
        assert!(check_config(&AppConfig::default()).is_ok());
    }
}
