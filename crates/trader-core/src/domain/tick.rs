//! 실시간 푸시 알림 타임스탬프.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// 마지막 실시간 푸시 시각(epoch 밀리초)을 담는 단일 슬롯.
///
/// 거래소 연결 컨텍스트가 쓰고 엔진 루프가 읽습니다. 최신 값만 의미가 있으므로
/// 큐가 아닌 원자적 스칼라 하나로 충분합니다. 0은 푸시가 없었음을 뜻합니다.
#[derive(Debug, Clone, Default)]
pub struct TickSignal {
    last_tick_ms: Arc<AtomicI64>,
}

impl TickSignal {
    /// 새 신호를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 시각으로 푸시를 기록합니다.
    pub fn notify(&self) {
        self.notify_at(Utc::now().timestamp_millis());
    }

    /// 지정한 시각으로 푸시를 기록합니다.
    pub fn notify_at(&self, timestamp_ms: i64) {
        self.last_tick_ms.store(timestamp_ms, Ordering::Release);
    }

    /// 마지막 푸시 시각 (epoch 밀리초).
    pub fn last_tick_ms(&self) -> i64 {
        self.last_tick_ms.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_slot() {
        let signal = TickSignal::new();
        let writer = signal.clone();

        assert_eq!(signal.last_tick_ms(), 0);
        writer.notify_at(1_234);
        assert_eq!(signal.last_tick_ms(), 1_234);
        writer.notify_at(5_678);
        assert_eq!(signal.last_tick_ms(), 5_678);
    }
}
