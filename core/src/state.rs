//! 游戏状态记录

use std::time::Duration;

use crate::signal::Signal;

/// 引擎阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 空闲：没有进行中的游戏
    Idle,
    /// 回放序列中，输入被丢弃
    Showing,
    /// 等待玩家复现，看门狗计时中
    AwaitingInput,
    /// 失败动画中，输入被丢弃
    Failing,
}

impl Phase {
    /// 阶段名称（用于日志）
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Showing => "showing",
            Self::AwaitingInput => "awaiting_input",
            Self::Failing => "failing",
        }
    }

    /// 是否有进行中的游戏
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// 单局游戏的全部可变状态
///
/// `high_score` 跨局保留，其余字段在每次 `reset` 时恢复初值。
#[derive(Debug, Clone)]
pub struct GameState {
    /// 目标序列
    pub sequence: Vec<Signal>,
    /// 本轮玩家已输入的信号
    pub user_progress: Vec<Signal>,
    /// 已正确复现的前缀长度
    pub sequence_index: usize,
    /// 上一次完整复现的序列长度
    pub score: u32,
    /// 本次运行中的最高分
    pub high_score: u32,
    /// 当前阶段
    pub phase: Phase,
    /// 当前节拍间隔
    pub interval: Duration,
}

impl GameState {
    /// 以给定初始间隔创建空闲状态
    #[must_use]
    pub const fn new(baseline_interval: Duration) -> Self {
        Self {
            sequence: Vec::new(),
            user_progress: Vec::new(),
            sequence_index: 0,
            score: 0,
            high_score: 0,
            phase: Phase::Idle,
            interval: baseline_interval,
        }
    }

    /// 恢复初值（保留最高分），阶段回到 `Idle`
    pub fn reset(&mut self, baseline_interval: Duration) {
        self.sequence.clear();
        self.user_progress.clear();
        self.sequence_index = 0;
        self.score = 0;
        self.phase = Phase::Idle;
        self.interval = baseline_interval;
    }

    /// 开始新一轮的复现尝试
    pub fn begin_attempt(&mut self) {
        self.user_progress.clear();
        self.sequence_index = 0;
    }

    /// 序列长度（作为分数）
    #[must_use]
    pub fn sequence_len(&self) -> u32 {
        u32::try_from(self.sequence.len()).unwrap_or(u32::MAX)
    }

    /// 将分数计入最高分，返回最高分是否被刷新
    pub fn commit_high_score(&mut self) -> bool {
        if self.score > self.high_score {
            self.high_score = self.score;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_high_score() {
        let base = Duration::from_millis(1000);
        let mut st = GameState::new(base);
        st.sequence = vec![Signal::Red, Signal::Blue];
        st.user_progress = vec![Signal::Red];
        st.sequence_index = 1;
        st.score = 1;
        st.high_score = 4;
        st.phase = Phase::AwaitingInput;
        st.interval = Duration::from_millis(700);

        st.reset(base);
        assert!(st.sequence.is_empty());
        assert!(st.user_progress.is_empty());
        assert_eq!(st.sequence_index, 0);
        assert_eq!(st.score, 0);
        assert_eq!(st.high_score, 4);
        assert_eq!(st.phase, Phase::Idle);
        assert_eq!(st.interval, base);
    }

    #[test]
    fn test_commit_high_score() {
        let mut st = GameState::new(Duration::from_millis(1000));
        st.high_score = 3;
        st.score = 2;
        assert!(!st.commit_high_score());
        assert_eq!(st.high_score, 3);
        st.score = 5;
        assert!(st.commit_high_score());
        assert_eq!(st.high_score, 5);
    }
}
