//! # Timer 模块
//!
//! 单槽定时器：在虚拟时钟上最多挂起一个回调。
//!
//! 调度前总是先取消旧的回调，因此任何时刻最多只有一个待决的决策点。

use std::time::Duration;

/// 定时器到期时要执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// 重新进入调度决策
    Play,
    /// 发出完成通知
    Done,
}

/// 单槽定时器
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timer {
    pending: Option<(Duration, TimerAction)>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在 `now + delay` 时执行 `action`，覆盖之前挂起的回调
    pub fn schedule(&mut self, now: Duration, delay: Duration, action: TimerAction) {
        self.pending = Some((now + delay, action));
    }

    /// 取消挂起的回调
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// 挂起回调的到期时刻
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.map(|(due, _)| due)
    }

    /// 挂起的动作
    pub fn action(&self) -> Option<TimerAction> {
        self.pending.map(|(_, action)| action)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 若回调在 `now` 之前（含）到期，取出它
    pub fn take_due(&mut self, now: Duration) -> Option<(Duration, TimerAction)> {
        match self.pending {
            Some((due, _)) if due <= now => self.pending.take(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_replaces_pending() {
        let mut timer = Timer::new();
        timer.schedule(Duration::ZERO, Duration::from_secs(5), TimerAction::Play);
        timer.schedule(Duration::from_secs(1), Duration::from_secs(1), TimerAction::Done);

        assert_eq!(timer.deadline(), Some(Duration::from_secs(2)));
        assert_eq!(timer.action(), Some(TimerAction::Done));
    }

    #[test]
    fn test_take_due() {
        let mut timer = Timer::new();
        timer.schedule(Duration::ZERO, Duration::from_secs(3), TimerAction::Play);

        assert_eq!(timer.take_due(Duration::from_secs(2)), None);
        assert!(timer.is_pending());

        assert_eq!(
            timer.take_due(Duration::from_secs(3)),
            Some((Duration::from_secs(3), TimerAction::Play))
        );
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_cancel() {
        let mut timer = Timer::new();
        timer.schedule(Duration::ZERO, Duration::from_secs(1), TimerAction::Play);
        timer.cancel();
        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.take_due(Duration::from_secs(10)), None);
    }
}
