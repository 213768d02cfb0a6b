//! 可取消的单任务定时槽
//!
//! 每个槽最多持有一个待执行任务：重新装填会替换旧任务，取消会直接丢弃。
//! 引擎为“驱动”（回放、失败动画、下一轮）和“看门狗”各持有一个槽，
//! 因此任意时刻最多只有一个活动的驱动任务和一个看门狗。

use std::time::Instant;

/// 单任务定时槽
#[derive(Debug, Clone)]
pub struct TimerSlot<T> {
    /// 截止时刻与任务
    pending: Option<(Instant, T)>,
}

impl<T> Default for TimerSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerSlot<T> {
    /// 创建空槽
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// 装填任务，替换已有任务
    pub fn arm(&mut self, at: Instant, task: T) {
        self.pending = Some((at, task));
    }

    /// 取消待执行任务
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// 是否有待执行任务
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// 待执行任务的截止时刻
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    /// 若任务已到期则取出
    pub fn take_due(&mut self, now: Instant) -> Option<(Instant, T)> {
        match self.deadline() {
            Some(at) if at <= now => self.pending.take(),
            _ => None,
        }
    }
}
