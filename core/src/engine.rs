//! 序列记忆引擎
//!
//! 状态机：`Idle` → `Showing` → `AwaitingInput` → (`Showing` | `Failing`) → `Idle`。
//!
//! 引擎自身不持有时钟，所有操作都接收调用方给出的当前时刻：
//! - `start` / `stop` / `submit_input`：外部事件
//! - `advance`：推进到给定时刻，按截止时间顺序执行到期的定时任务
//!
//! 到期任务以其计划时刻为基准安排后续任务，因此推进的粒度不影响结果。

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::Timings;
use crate::presenter::{LightState, Presenter, SoundPlayer};
use crate::schedule::TimerSlot;
use crate::signal::{Signal, SignalSource};
use crate::state::{GameState, Phase};

/// 提示消息
mod text {
    pub const READY: &str = "READY";
    pub const PLAY: &str = "PLAY";
    pub const OVER: &str = "OVER";
    pub const STOPPED: &str = "STOPPED";

    pub const PRESS_START: &str = "Press START to begin.";
    pub const GET_READY: &str = "Get ready...";
    pub const WATCH: &str = "Watch the sequence...";
    pub const YOUR_TURN: &str = "Your turn!";
    pub const CORRECT: &str = "Correct...";
    pub const INCORRECT: &str = "Incorrect!";
    pub const STOPPED_MSG: &str = "Game stopped.";
}

/// 失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// 输入与序列不符
    Mismatch,
    /// 输入数量超过序列长度
    Overflow,
    /// 看门狗超时
    Timeout,
}

impl FailureCause {
    /// 原因名称（用于日志）
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mismatch => "mismatch",
            Self::Overflow => "overflow",
            Self::Timeout => "timeout",
        }
    }
}

/// 驱动槽中的任务
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    /// 开始新一轮：追加信号并开始回放
    BeginRound,
    /// 回放第 n 个信号；越过末尾时转入等待输入
    PlayStep(usize),
    /// 第 n 次失败闪烁（从 1 开始）
    FailPulse(u32),
    /// 失败动画结束，结算并回到空闲
    FinishFailure,
}

/// 当前时刻之后 `d` 的时刻
fn after(at: Instant, d: Duration) -> Instant {
    at.checked_add(d).unwrap_or(at)
}

/// 序列记忆引擎
pub struct Engine<P, S> {
    /// 计时参数
    timings: Timings,
    /// 游戏状态
    state: GameState,
    /// 驱动任务（回放 / 失败动画 / 下一轮）
    driver: TimerSlot<Task>,
    /// 输入看门狗
    watchdog: TimerSlot<()>,
    /// 信号来源
    signals: Box<dyn SignalSource>,
    /// 显示端
    presenter: P,
    /// 声音端
    sound: S,
    /// 最近一次失败的原因
    last_failure: Option<FailureCause>,
}

impl<P: Presenter, S: SoundPlayer> Engine<P, S> {
    /// 创建处于空闲状态的引擎，并向显示端发布初始状态
    pub fn new(
        timings: Timings,
        signals: Box<dyn SignalSource>,
        presenter: P,
        sound: S,
    ) -> Self {
        let state = GameState::new(timings.baseline_interval);
        let mut engine = Self {
            timings,
            state,
            driver: TimerSlot::new(),
            watchdog: TimerSlot::new(),
            signals,
            presenter,
            sound,
            last_failure: None,
        };
        engine.announce_ready();
        engine
    }

    /// 开始新游戏
    ///
    /// 仅在 `Idle` 下生效，返回是否开始了新游戏。
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state.phase.is_active() {
            debug!(phase = self.state.phase.as_str(), "游戏进行中，忽略开始请求");
            return false;
        }
        if let Err(e) = self.sound.play_start() {
            warn!(error = %e, "开局提示音播放失败");
        }
        self.reset_state();
        self.last_failure = None;
        self.state.phase = Phase::Showing;

        self.presenter.set_light(LightState::On);
        self.presenter.set_status_text(text::PLAY);
        self.presenter.set_message(text::GET_READY);
        self.presenter
            .update_score(self.state.score, self.state.high_score);

        self.driver
            .arm(after(now, self.timings.preamble), Task::BeginRound);
        info!(high_score = self.state.high_score, "游戏开始");
        true
    }

    /// 中止游戏（不计分、不播放失败动画）
    ///
    /// 仅在有进行中的游戏时生效，返回是否中止了游戏。
    pub fn stop(&mut self) -> bool {
        if !self.state.phase.is_active() {
            return false;
        }
        let phase = self.state.phase;
        self.reset_state();

        self.presenter.set_light(LightState::Off);
        self.presenter.set_status_text(text::STOPPED);
        self.presenter.set_message(text::STOPPED_MSG);
        self.presenter
            .update_score(self.state.score, self.state.high_score);
        info!(from = phase.as_str(), "游戏已中止");
        true
    }

    /// 提交一次玩家输入
    ///
    /// 仅在 `AwaitingInput` 下被接受，返回输入是否被接受。
    pub fn submit_input(&mut self, signal: Signal, now: Instant) -> bool {
        if self.state.phase != Phase::AwaitingInput {
            debug!(
                phase = self.state.phase.as_str(),
                signal = %signal,
                "当前阶段不接受输入"
            );
            return false;
        }
        self.play_tone(signal);
        self.watchdog.arm(after(now, self.timings.input_timeout), ());
        self.state.user_progress.push(signal);

        if self.state.user_progress.len() > self.state.sequence.len() {
            self.fail(FailureCause::Overflow, now);
            return true;
        }
        let expected = self.state.sequence.get(self.state.sequence_index).copied();
        if expected != Some(signal) {
            self.fail(FailureCause::Mismatch, now);
            return true;
        }

        self.state.sequence_index += 1;
        self.presenter.set_message(text::CORRECT);
        if self.state.sequence_index == self.state.sequence.len() {
            self.state.score = self.state.sequence_len();
            self.state.commit_high_score();
            self.presenter
                .update_score(self.state.score, self.state.high_score);
            self.watchdog.cancel();
            self.driver
                .arm(after(now, self.timings.round_pause), Task::BeginRound);
            info!(
                score = self.state.score,
                high_score = self.state.high_score,
                "本轮完成"
            );
        }
        true
    }

    /// 推进到 `now`，按截止时间顺序执行所有到期任务
    ///
    /// 返回执行的任务数。
    pub fn advance(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        loop {
            let driver_at = self.driver.deadline().filter(|at| *at <= now);
            let watchdog_at = self.watchdog.deadline().filter(|at| *at <= now);
            match (driver_at, watchdog_at) {
                (None, None) => break,
                (Some(d), Some(w)) if w < d => self.fire_watchdog(now),
                (Some(_), _) => self.fire_driver(now),
                (None, Some(_)) => self.fire_watchdog(now),
            }
            fired += 1;
        }
        fired
    }

    /// 最近的待执行时刻（驱动或看门狗）
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.driver.deadline(), self.watchdog.deadline()) {
            (Some(d), Some(w)) => Some(d.min(w)),
            (d, w) => d.or(w),
        }
    }

    /// 看门狗截止时刻
    #[must_use]
    pub fn watchdog_deadline(&self) -> Option<Instant> {
        self.watchdog.deadline()
    }

    /// 当前阶段
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    /// 目标序列
    #[must_use]
    pub fn sequence(&self) -> &[Signal] {
        &self.state.sequence
    }

    /// 本轮已输入的信号
    #[must_use]
    pub fn user_progress(&self) -> &[Signal] {
        &self.state.user_progress
    }

    /// 已正确复现的前缀长度
    #[must_use]
    pub const fn sequence_index(&self) -> usize {
        self.state.sequence_index
    }

    /// 当前分数
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.state.score
    }

    /// 最高分
    #[must_use]
    pub const fn high_score(&self) -> u32 {
        self.state.high_score
    }

    /// 当前节拍间隔
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.state.interval
    }

    /// 完整状态快照
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// 计时参数
    #[must_use]
    pub const fn timings(&self) -> &Timings {
        &self.timings
    }

    /// 最近一次失败的原因（新游戏开始时清除）
    #[must_use]
    pub const fn last_failure(&self) -> Option<FailureCause> {
        self.last_failure
    }

    /// 显示端
    #[must_use]
    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    /// 声音端
    #[must_use]
    pub const fn sound(&self) -> &S {
        &self.sound
    }

    /// 执行到期的驱动任务
    fn fire_driver(&mut self, now: Instant) {
        let Some((at, task)) = self.driver.take_due(now) else {
            return;
        };
        debug!(?task, "驱动任务到期");
        match task {
            Task::BeginRound => self.next_sequence(at),
            Task::PlayStep(i) => self.play_step(i, at),
            Task::FailPulse(n) => self.fail_pulse(n, at),
            Task::FinishFailure => self.finish_game(),
        }
    }

    /// 执行到期的看门狗
    fn fire_watchdog(&mut self, now: Instant) {
        let Some((at, ())) = self.watchdog.take_due(now) else {
            return;
        };
        if self.state.phase == Phase::AwaitingInput {
            self.fail(FailureCause::Timeout, at);
        }
    }

    /// 开始新一轮：追加一个信号、按规则提速、开始回放
    fn next_sequence(&mut self, at: Instant) {
        self.state.begin_attempt();
        let signal = self.signals.next_signal();
        self.state.sequence.push(signal);

        let len = self.state.sequence.len();
        let interval = self.timings.interval_after(self.state.interval, len);
        if interval != self.state.interval {
            info!(
                len,
                interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
                "提速"
            );
            self.state.interval = interval;
        }

        self.state.phase = Phase::Showing;
        self.presenter.set_message(text::WATCH);
        self.driver
            .arm(after(at, self.state.interval), Task::PlayStep(0));
        debug!(len, signal = %signal, "新一轮开始");
    }

    /// 回放一步；序列结束后转入等待输入
    fn play_step(&mut self, i: usize, at: Instant) {
        let Some(signal) = self.state.sequence.get(i).copied() else {
            self.state.phase = Phase::AwaitingInput;
            self.presenter.set_message(text::YOUR_TURN);
            self.watchdog.arm(after(at, self.timings.input_timeout), ());
            return;
        };
        let interval = self.state.interval;
        self.presenter.flash(&[signal], interval / 2);
        self.play_tone(signal);
        self.driver.arm(after(at, interval), Task::PlayStep(i + 1));
    }

    /// 进入失败阶段
    fn fail(&mut self, cause: FailureCause, at: Instant) {
        self.driver.cancel();
        self.watchdog.cancel();
        self.state.phase = Phase::Failing;
        self.last_failure = Some(cause);
        warn!(
            cause = cause.as_str(),
            len = self.state.sequence.len(),
            progress = self.state.user_progress.len(),
            "复现失败"
        );

        self.presenter.set_message(text::INCORRECT);
        self.presenter.set_status_text(text::OVER);
        self.driver
            .arm(after(at, self.state.interval), Task::FailPulse(1));
    }

    /// 失败动画：所有信号同时闪烁一次
    fn fail_pulse(&mut self, n: u32, at: Instant) {
        let interval = self.state.interval;
        self.presenter.flash(&Signal::ALL, interval / 2);
        for signal in Signal::ALL {
            self.play_tone(signal);
        }
        let next = if n >= self.timings.failure_pulses {
            Task::FinishFailure
        } else {
            Task::FailPulse(n + 1)
        };
        self.driver.arm(after(at, interval), next);
    }

    /// 结算并回到空闲
    fn finish_game(&mut self) {
        let score = self.state.score;
        self.state.commit_high_score();
        let high_score = self.state.high_score;

        self.presenter
            .set_message(&format!("Incorrect! Game over. Score: {score}"));
        self.presenter.set_status_text(text::OVER);
        self.presenter.update_score(score, high_score);
        self.presenter.set_light(LightState::Off);
        self.presenter.game_over(score);
        info!(score, high_score, "游戏结束");

        self.reset_state();
        self.announce_ready();
    }

    /// 取消全部定时任务并恢复初始状态（保留最高分）
    fn reset_state(&mut self) {
        self.driver.cancel();
        self.watchdog.cancel();
        self.state.reset(self.timings.baseline_interval);
    }

    /// 发布空闲状态
    fn announce_ready(&mut self) {
        self.presenter.set_light(LightState::Off);
        self.presenter.set_status_text(text::READY);
        self.presenter.set_message(text::PRESS_START);
        self.presenter
            .update_score(self.state.score, self.state.high_score);
    }

    /// 播放按键音，失败只记录日志
    fn play_tone(&mut self, signal: Signal) {
        if let Err(e) = self.sound.play(signal) {
            warn!(error = %e, signal = %signal, "按键音播放失败");
        }
    }
}
