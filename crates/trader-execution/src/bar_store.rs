//! 시간 버킷 봉 저장소와 증분 병합.

use tracing::debug;
use trader_core::Bar;

/// 증분 병합을 쓰기 위해 필요한 최소 봉 수. 미만이면 전체 조회로 다시 채웁니다.
pub const MIN_BARS: usize = 10;

/// 증분 병합 한 번의 결과 요약.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// 헤드를 통째로 교체한 횟수
    pub replaced: usize,
    /// 헤드와 부분 병합한 횟수
    pub merged: usize,
    /// 새 버킷으로 앞에 추가된 봉 수
    pub inserted: usize,
    /// 헤드보다 오래되어 버린 봉 수
    pub stale: usize,
}

impl MergeOutcome {
    /// 저장소 내용이 바뀌었는지 여부.
    pub fn is_changed(&self) -> bool {
        self.replaced + self.merged + self.inserted > 0
    }
}

/// 최신 우선(인덱스 0이 헤드)으로 정렬된 봉 시퀀스.
///
/// 버킷 시작 시간은 인덱스 0부터 엄격히 감소합니다. 헤드만 새 서브바를 받을 수
/// 있고 나머지 봉은 더 이상 바뀌지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct BarStore {
    bars: Vec<Bar>,
}

impl BarStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 보유 봉 (최신 우선).
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// 헤드 봉.
    pub fn head(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 전체 조회가 필요한지 (콜드 스타트 또는 공백 이후).
    pub fn needs_full_fetch(&self) -> bool {
        self.bars.len() < MIN_BARS
    }

    /// 전체 조회 결과로 시퀀스를 교체합니다.
    ///
    /// 입력 순서와 상관없이 최신 우선으로 정렬하고 같은 버킷은 하나만 남깁니다.
    pub fn replace(&mut self, mut bars: Vec<Bar>) {
        bars.sort_by(|a, b| b.open_time.cmp(&a.open_time));
        bars.dedup_by_key(|b| b.open_time);
        for bar in &mut bars {
            bar.changed = true;
        }
        self.bars = bars;
    }

    /// 증분 조회 결과(최신 우선)를 헤드에 병합합니다.
    ///
    /// 오래된 것부터 하나씩 현재 헤드 H와 비교합니다:
    /// - H보다 오래된 버킷은 버립니다.
    /// - H와 같은 버킷이면 첫 서브바가 같을 때 통째로 교체하고, 다르면
    ///   두 부분 조회를 서브바 단위로 합칩니다.
    /// - H보다 새 버킷이면 맨 앞에 추가되어 새 헤드가 됩니다.
    pub fn merge_incremental(&mut self, new_bars: Vec<Bar>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        for mut bar in new_bars.into_iter().rev() {
            bar.changed = true;

            let Some(head) = self.bars.first_mut() else {
                self.bars.push(bar);
                outcome.inserted += 1;
                continue;
            };

            if bar.open_time < head.open_time {
                outcome.stale += 1;
            } else if bar.open_time == head.open_time {
                if same_opening_subbar(head, &bar) {
                    *head = bar;
                    outcome.replaced += 1;
                } else {
                    *head = head.merged_with(&bar);
                    outcome.merged += 1;
                }
            } else {
                self.bars.insert(0, bar);
                outcome.inserted += 1;
            }
        }

        if outcome.is_changed() {
            debug!(
                replaced = outcome.replaced,
                merged = outcome.merged,
                inserted = outcome.inserted,
                stale = outcome.stale,
                "Bars merged"
            );
        }
        outcome
    }

    /// 모든 봉의 `changed` 플래그를 지웁니다.
    pub fn clear_changed(&mut self) {
        for bar in &mut self.bars {
            bar.changed = false;
        }
    }

    /// `changed`가 설정된 봉 수.
    pub fn changed_count(&self) -> usize {
        self.bars.iter().filter(|b| b.changed).count()
    }
}

/// 두 조회가 같은 서브바에서 시작하는지. 서브바가 없는 쪽이 있으면 교체로 처리합니다.
fn same_opening_subbar(head: &Bar, incoming: &Bar) -> bool {
    match (head.first_subbar(), incoming.first_subbar()) {
        (Some(a), Some(b)) => a.open_time == b.open_time,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use trader_core::Subbar;

    fn minute(n: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 - 1_700_000_000 % 3600, 0).unwrap() + Duration::minutes(n)
    }

    fn sub(n: i64, price: Decimal) -> Subbar {
        Subbar::new(minute(n), price, price, price, price, dec!(1))
    }

    /// `bucket` 시작(분)의 60분 봉을 `minutes` 서브바로 생성.
    fn bar(bucket: i64, minutes: std::ops::Range<i64>) -> Bar {
        let subbars = minutes.map(|n| sub(n, Decimal::from(100 + n))).collect();
        Bar::from_subbars(minute(bucket), subbars)
    }

    fn store_with(buckets: &[i64]) -> BarStore {
        let mut store = BarStore::new();
        store.replace(buckets.iter().map(|b| bar(*b, *b..*b + 60)).collect());
        store.clear_changed();
        store
    }

    #[test]
    fn test_needs_full_fetch_below_min_bars() {
        let store = store_with(&[0, 60, 120]);
        assert!(store.needs_full_fetch());

        let store = store_with(&(0..10).map(|i| i * 60).collect::<Vec<_>>());
        assert!(!store.needs_full_fetch());
    }

    #[test]
    fn test_replace_sorts_newest_first() {
        let store = store_with(&[60, 0, 120, 60]);
        let times: Vec<_> = store.bars().iter().map(|b| b.open_time).collect();

        assert_eq!(times, vec![minute(120), minute(60), minute(0)]);
    }

    #[test]
    fn test_same_opening_subbar_replaces_head() {
        let mut store = BarStore::new();
        store.replace(vec![bar(60, 60..70), bar(0, 0..60)]);
        store.clear_changed();

        let incoming = bar(60, 60..65);
        let outcome = store.merge_incremental(vec![incoming.clone()]);

        assert_eq!(outcome.replaced, 1);
        assert_eq!(store.head().unwrap().subbars, incoming.subbars);
        assert!(store.head().unwrap().changed);
        assert!(!store.bars()[1].changed);
    }

    #[test]
    fn test_partial_views_are_merged() {
        let mut store = BarStore::new();
        store.replace(vec![bar(60, 60..70), bar(0, 0..60)]);

        let outcome = store.merge_incremental(vec![bar(60, 65..75)]);
        let head = store.head().unwrap();

        assert_eq!(outcome.merged, 1);
        assert_eq!(head.subbars.len(), 15);
        assert_eq!(head.first_subbar().unwrap().open_time, minute(60));
        assert_eq!(head.last_subbar().unwrap().open_time, minute(74));
        assert_eq!(head.open, dec!(160));
        assert_eq!(head.close, dec!(174));
    }

    #[test]
    fn test_new_buckets_inserted_in_order() {
        let mut store = store_with(&[0]);

        // 최신 우선 입력: 180, 120, 60, 그리고 오래된 버킷 하나
        let outcome = store.merge_incremental(vec![
            bar(180, 180..185),
            bar(120, 120..180),
            bar(60, 60..120),
            bar(-60, -60..0),
        ]);

        assert_eq!(outcome.inserted, 3);
        assert_eq!(outcome.stale, 1);
        let times: Vec<_> = store.bars().iter().map(|b| b.open_time).collect();
        assert_eq!(times, vec![minute(180), minute(120), minute(60), minute(0)]);
        assert_eq!(store.changed_count(), 3);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut store = store_with(&[0, 60]);
        let before = store.bars().to_vec();

        let outcome = store.merge_incremental(Vec::new());

        assert!(!outcome.is_changed());
        assert_eq!(store.bars(), before.as_slice());
    }

    #[test]
    fn test_clear_changed() {
        let mut store = BarStore::new();
        store.replace(vec![bar(0, 0..3)]);
        assert_eq!(store.changed_count(), 1);

        store.clear_changed();
        assert_eq!(store.changed_count(), 0);
    }
}
