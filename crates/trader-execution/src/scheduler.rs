//! 틱 스케줄링 상태와 트리거 조건.

use std::fmt;
use std::time::Duration;

/// 엔진 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// 루프 실행 중
    Running,
    /// 정지됨 (종료 상태, 더 이상 거래소/전략 호출 없음)
    Stopped,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Running => write!(f, "running"),
            EngineState::Stopped => write!(f, "stopped"),
        }
    }
}

/// 주기 실행과 푸시 알림 디바운스를 결합한 틱 트리거.
///
/// 시각은 모두 epoch 밀리초입니다. 다음 중 하나면 틱을 실행합니다:
/// - 마지막 실행 이후 `loop_interval`보다 오래 지남
/// - 마지막 실행 이후 푸시가 있었고, 그 푸시가 `debounce`보다 오래됨
#[derive(Debug, Clone, Copy)]
pub struct TickTrigger {
    loop_interval_ms: i64,
    debounce_ms: i64,
    last_run_ms: i64,
}

impl TickTrigger {
    /// 새 트리거를 생성합니다. 첫 평가에서 바로 실행됩니다.
    pub fn new(loop_interval: Duration, debounce: Duration) -> Self {
        Self {
            loop_interval_ms: duration_ms(loop_interval),
            debounce_ms: duration_ms(debounce),
            last_run_ms: 0,
        }
    }

    /// 지금 틱을 실행해야 하는지 판정합니다.
    pub fn should_fire(&self, now_ms: i64, last_tick_ms: i64) -> bool {
        let last = self.last_run_ms;
        now_ms - last > self.loop_interval_ms
            || (last < last_tick_ms && last_tick_ms < now_ms - self.debounce_ms)
    }

    /// 실행 시각을 기록합니다.
    pub fn mark_run(&mut self, now_ms: i64) {
        self.last_run_ms = now_ms;
    }
}

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger() -> TickTrigger {
        TickTrigger::new(Duration::from_millis(5_000), Duration::from_millis(2_000))
    }

    #[test]
    fn test_first_evaluation_fires() {
        let trigger = trigger();
        assert!(trigger.should_fire(1_700_000_000_000, 0));
    }

    #[test]
    fn test_push_inside_debounce_waits_for_interval() {
        let mut trigger = trigger();
        trigger.mark_run(0);

        // 푸시 t=3, 디바운스 2 → t=5 이전에는 실행하지 않음
        for now in [1_000, 3_000, 4_000, 4_999, 5_000] {
            assert!(!trigger.should_fire(now, 3_000), "fired at {now}");
        }
        assert!(trigger.should_fire(5_001, 3_000));
    }

    #[test]
    fn test_debounced_push_fires_early() {
        let mut trigger = trigger();
        trigger.mark_run(0);

        assert!(!trigger.should_fire(3_000, 1_000));
        assert!(trigger.should_fire(3_001, 1_000));
    }

    #[test]
    fn test_push_before_last_run_is_ignored() {
        let mut trigger = trigger();
        trigger.mark_run(10_000);

        assert!(!trigger.should_fire(14_000, 9_000));
        assert!(!trigger.should_fire(14_000, 10_000));
        assert!(trigger.should_fire(15_001, 9_000));
    }
}
