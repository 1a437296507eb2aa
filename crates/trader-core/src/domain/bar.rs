//! 시간 버킷 단위 OHLCV 봉 데이터.
//!
//! 이 모듈은 봉 관련 타입을 정의합니다:
//! - `Subbar` - 버킷을 구성하는 세부 구간 샘플
//! - `Bar` - 하나의 시간 버킷 (서브바로부터 OHLCV를 재구성)

use crate::types::{Price, Quantity};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 버킷을 구성하는 세부 구간 샘플 (예: 1분봉).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subbar {
    /// 샘플 시작 시간
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Quantity,
}

impl Subbar {
    /// 새 서브바를 생성합니다.
    pub fn new(
        open_time: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// 하나의 시간 버킷에 해당하는 봉.
///
/// 서브바는 시간 오름차순으로 정렬되며, 서브바가 있는 경우 OHLCV는 항상
/// 서브바로부터 계산된 값과 일치합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// 버킷 시작 시간 (버킷 키)
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Quantity,
    /// 마지막 소비 이후 변경 여부
    #[serde(default)]
    pub changed: bool,
    /// 세부 구간 샘플 (시간 오름차순)
    #[serde(default)]
    pub subbars: Vec<Subbar>,
}

impl Bar {
    /// 서브바 목록으로부터 봉을 생성합니다.
    ///
    /// 서브바는 시간순으로 정렬되고 같은 타임스탬프는 처음 것만 남습니다.
    /// 서브바가 비어 있으면 가격과 거래량이 0인 봉이 됩니다.
    pub fn from_subbars(open_time: DateTime<Utc>, mut subbars: Vec<Subbar>) -> Self {
        subbars.sort_by_key(|s| s.open_time);
        subbars.dedup_by_key(|s| s.open_time);

        let mut bar = Self {
            open_time,
            open: Decimal::ZERO,
            high: Decimal::ZERO,
            low: Decimal::ZERO,
            close: Decimal::ZERO,
            volume: Decimal::ZERO,
            changed: true,
            subbars,
        };
        bar.recompute();
        bar
    }

    /// 서브바가 없는 단일 봉을 생성합니다.
    pub fn flat(
        open_time: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            changed: true,
            subbars: Vec::new(),
        }
    }

    /// 타임스탬프가 속한 버킷의 시작 시간을 반환합니다.
    pub fn bucket_start(time: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
        let width = i64::from(minutes.max(1)) * 60;
        let secs = time.timestamp();
        let start = secs - secs.rem_euclid(width);
        Utc.timestamp_opt(start, 0).single().unwrap_or(time)
    }

    /// 가장 오래된 서브바.
    pub fn first_subbar(&self) -> Option<&Subbar> {
        self.subbars.first()
    }

    /// 가장 최근 서브바.
    pub fn last_subbar(&self) -> Option<&Subbar> {
        self.subbars.last()
    }

    /// 새 서브바를 추가합니다.
    ///
    /// 마지막 서브바보다 엄격히 최신인 경우에만 추가되며, 추가 여부를 반환합니다.
    pub fn push_subbar(&mut self, subbar: Subbar) -> bool {
        if let Some(last) = self.subbars.last() {
            if subbar.open_time <= last.open_time {
                return false;
            }
        }

        if self.subbars.is_empty() {
            self.open = subbar.open;
            self.high = subbar.high;
            self.low = subbar.low;
            self.volume = Decimal::ZERO;
        } else {
            self.high = self.high.max(subbar.high);
            self.low = self.low.min(subbar.low);
        }
        self.close = subbar.close;
        self.volume += subbar.volume;
        self.subbars.push(subbar);
        self.changed = true;
        true
    }

    /// 같은 버킷에 대한 두 부분 조회 결과를 병합합니다.
    ///
    /// `self`는 기존 헤드 버킷, `newer`는 새로 조회한 같은 버킷입니다.
    /// 결과 서브바는 다음 순서로 구성됩니다:
    /// 1. `newer`의 첫 서브바보다 오래된 기존 서브바 (버킷의 실제 시가 보존)
    /// 2. `newer`의 서브바 전체 (겹치는 구간은 새 데이터 우선)
    /// 3. `newer`의 마지막 서브바보다 최신인 기존 서브바
    ///
    /// 어떤 타임스탬프도 중복되거나 누락되지 않습니다.
    pub fn merged_with(&self, newer: &Bar) -> Bar {
        let (Some(first_new), Some(last_new)) = (newer.first_subbar(), newer.last_subbar()) else {
            return newer.clone();
        };

        let mut subbars: Vec<Subbar> = self
            .subbars
            .iter()
            .take_while(|s| s.open_time < first_new.open_time)
            .cloned()
            .collect();
        subbars.extend(newer.subbars.iter().cloned());
        subbars.extend(
            self.subbars
                .iter()
                .filter(|s| s.open_time > last_new.open_time)
                .cloned(),
        );

        Bar::from_subbars(self.open_time, subbars)
    }

    /// 서브바로부터 OHLCV를 다시 계산합니다.
    fn recompute(&mut self) {
        let (Some(first), Some(last)) = (self.subbars.first(), self.subbars.last()) else {
            return;
        };

        self.open = first.open;
        self.close = last.close;
        self.high = self
            .subbars
            .iter()
            .map(|s| s.high)
            .max()
            .unwrap_or(first.high);
        self.low = self
            .subbars
            .iter()
            .map(|s| s.low)
            .min()
            .unwrap_or(first.low);
        self.volume = self.subbars.iter().map(|s| s.volume).sum();
    }
}
