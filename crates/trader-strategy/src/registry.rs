//! 이름 기반 전략 레지스트리.

use crate::strategies::{MonitorStrategy, SmaCrossStrategy};
use crate::{Strategy, StrategyError};
use serde_json::Value;

/// 내장 전략 메타데이터.
#[derive(Clone)]
pub struct StrategyMeta {
    /// 전략 ID (영문, snake_case)
    pub id: &'static str,
    /// 별칭
    pub aliases: &'static [&'static str],
    /// 전략 설명
    pub description: &'static str,
    /// 팩토리 함수 (전략 파라미터를 받음)
    pub factory: fn(Value) -> Result<Box<dyn Strategy>, StrategyError>,
}

impl std::fmt::Debug for StrategyMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyMeta")
            .field("id", &self.id)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("factory", &"<fn>")
            .finish()
    }
}

impl StrategyMeta {
    /// 전략 ID 또는 별칭으로 매칭 (대소문자 무시)
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.id == query || self.aliases.contains(&query.as_str())
    }
}

fn monitor(_params: Value) -> Result<Box<dyn Strategy>, StrategyError> {
    Ok(Box::new(MonitorStrategy::new()))
}

fn sma_cross(params: Value) -> Result<Box<dyn Strategy>, StrategyError> {
    Ok(Box::new(SmaCrossStrategy::from_params(params)?))
}

static BUILTIN: &[StrategyMeta] = &[
    StrategyMeta {
        id: "monitor",
        aliases: &["noop", "watch"],
        description: "Logs every tick without trading",
        factory: monitor,
    },
    StrategyMeta {
        id: "sma_cross",
        aliases: &["sma"],
        description: "Moving average crossover on closed bars",
        factory: sma_cross,
    },
];

/// 전략 레지스트리 조회 API
pub struct StrategyRegistry;

impl StrategyRegistry {
    /// 모든 내장 전략 메타데이터
    pub fn all() -> impl Iterator<Item = &'static StrategyMeta> {
        BUILTIN.iter()
    }

    /// ID/별칭으로 전략 검색
    pub fn find(query: &str) -> Option<&'static StrategyMeta> {
        Self::all().find(|meta| meta.matches(query))
    }

    /// 전략 ID 목록
    pub fn list_ids() -> Vec<&'static str> {
        Self::all().map(|meta| meta.id).collect()
    }
}

/// 이름과 파라미터로 전략 인스턴스를 생성합니다.
///
/// 파라미터가 `null`이거나 빈 객체면 전략 기본값을 사용합니다.
pub fn create_strategy(name: &str, params: Value) -> Result<Box<dyn Strategy>, StrategyError> {
    let meta = StrategyRegistry::find(name)
        .ok_or_else(|| StrategyError::UnknownStrategy(name.to_string()))?;
    (meta.factory)(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_by_id_and_alias() {
        assert_eq!(create_strategy("monitor", Value::Null).unwrap().name(), "monitor");
        assert_eq!(create_strategy("SMA", json!({})).unwrap().name(), "sma_cross");
    }

    #[test]
    fn test_params_reach_strategy() {
        let params = json!({"short_period": 3, "long_period": 7});
        let strategy = create_strategy("sma_cross", params).unwrap();
        assert_eq!(strategy.get_state()["short_period"], 3);
        assert_eq!(strategy.get_state()["long_period"], 7);

        let err = create_strategy("sma", json!({"short_period": 30, "long_period": 7}))
            .err()
            .unwrap();
        assert!(matches!(err, StrategyError::InvalidParameter(_)));
    }

    #[test]
    fn test_unknown_strategy() {
        let err = create_strategy("martingale", Value::Null).err().unwrap();
        assert!(matches!(err, StrategyError::UnknownStrategy(name) if name == "martingale"));
        assert_eq!(StrategyRegistry::list_ids(), vec!["monitor", "sma_cross"]);
    }
}
