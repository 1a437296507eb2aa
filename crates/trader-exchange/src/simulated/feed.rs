//! 시뮬레이션 거래소용 1분 서브바 생성기.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use trader_core::{round_to_step, Price, RoundMethod, Subbar};

/// 랜덤 워크 기반 서브바 피드.
///
/// 같은 시드는 항상 같은 가격 경로를 만듭니다.
#[derive(Debug, Clone)]
pub struct RandomWalkFeed {
    rng: StdRng,
    last_close: Price,
    tick_size: Price,
    volatility: f64,
}

impl RandomWalkFeed {
    /// 새 피드를 생성합니다.
    pub fn new(start_price: Price, tick_size: Price, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            last_close: start_price,
            tick_size,
            volatility: 0.002,
        }
    }

    /// 1분당 변동폭을 설정합니다 (예: 0.2%의 경우 0.002).
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// 다음 서브바의 시가가 될 마지막 종가.
    pub fn last_close(&self) -> Price {
        self.last_close
    }

    /// 스크립트로 주입된 서브바 이후에도 경로가 이어지도록 종가를 맞춥니다.
    pub fn set_last_close(&mut self, price: Price) {
        self.last_close = price;
    }

    /// 주어진 시각의 서브바를 생성합니다.
    pub fn next_subbar(&mut self, open_time: DateTime<Utc>) -> Subbar {
        let change_pct = (self.rng.gen::<f64>() - 0.5) * 2.0 * self.volatility;
        let open = self.last_close;
        let close = self.round(
            open + open * Decimal::from_f64_retain(change_pct).unwrap_or_default(),
            RoundMethod::Round,
        );

        let high_extra = open * Decimal::from_f64_retain(self.rng.gen::<f64>() * self.volatility)
            .unwrap_or_default();
        let low_extra = open * Decimal::from_f64_retain(self.rng.gen::<f64>() * self.volatility)
            .unwrap_or_default();
        let high = self.round(open.max(close) + high_extra, RoundMethod::Ceil);
        let low = self.round(open.min(close) - low_extra, RoundMethod::Floor);

        let volume = Decimal::from_f64_retain(self.rng.gen_range(10.0..1000.0))
            .unwrap_or(dec!(100))
            .round_dp(3);

        self.last_close = close;
        Subbar::new(open_time, open, high, low, close, volume)
    }

    /// `start`부터 1분 간격으로 `count`개의 서브바를 생성합니다.
    pub fn generate(&mut self, start: DateTime<Utc>, count: usize) -> Vec<Subbar> {
        (0..count)
            .map(|i| self.next_subbar(start + Duration::minutes(i as i64)))
            .collect()
    }

    fn round(&self, price: Price, method: RoundMethod) -> Price {
        round_to_step(price, self.tick_size, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_same_seed_same_path() {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let a = RandomWalkFeed::new(dec!(50000), dec!(0.5), 7).generate(start, 20);
        let b = RandomWalkFeed::new(dec!(50000), dec!(0.5), 7).generate(start, 20);

        assert_eq!(a, b);
    }

    #[test]
    fn test_subbars_are_consistent() {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut feed = RandomWalkFeed::new(dec!(50000), dec!(0.5), 42);
        let subbars = feed.generate(start, 50);

        for pair in subbars.windows(2) {
            assert_eq!(pair[1].open, pair[0].close);
            assert_eq!(pair[1].open_time - pair[0].open_time, Duration::minutes(1));
        }
        for s in &subbars {
            assert!(s.high >= s.open.max(s.close));
            assert!(s.low <= s.open.min(s.close));
            assert!(s.volume > Decimal::ZERO);
        }
        assert_eq!(feed.last_close(), subbars[49].close);
    }
}
