//! 自动演奏：照着引擎给出的序列作答
//!
//! 用于演示模式与端到端测试。完成指定轮数后不再作答，由看门狗结束游戏。

use crate::engine::Engine;
use crate::presenter::{Presenter, SoundPlayer};
use crate::signal::Signal;
use crate::state::Phase;

/// 自动演奏者
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    /// 需要完成的轮数
    rounds: u32,
    /// 是否已开始过游戏
    started: bool,
}

/// 自动演奏者的下一步动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoMove {
    /// 开始游戏
    Start,
    /// 按下按键
    Press(Signal),
    /// 演奏结束，游戏已回到空闲
    Finished,
}

impl AutoPlayer {
    /// 创建完成 `rounds` 轮后停止作答的演奏者
    #[must_use]
    pub const fn new(rounds: u32) -> Self {
        Self {
            rounds,
            started: false,
        }
    }

    /// 根据引擎状态决定下一步
    pub fn next_move<P: Presenter, S: SoundPlayer>(
        &mut self,
        engine: &Engine<P, S>,
    ) -> Option<AutoMove> {
        match engine.phase() {
            Phase::Idle if self.started => Some(AutoMove::Finished),
            Phase::Idle => {
                self.started = true;
                Some(AutoMove::Start)
            }
            Phase::AwaitingInput if engine.score() < self.rounds => {
                let next = engine.user_progress().len();
                if next >= engine.sequence().len() {
                    // 本轮已完成，等待下一轮
                    return None;
                }
                engine.sequence().get(next).copied().map(AutoMove::Press)
            }
            Phase::AwaitingInput | Phase::Showing | Phase::Failing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use anyhow::Result;

    use super::*;
    use crate::config::Timings;
    use crate::presenter::LightState;
    use crate::signal::ScriptedSignals;

    struct Quiet;

    impl Presenter for Quiet {
        fn flash(&mut self, _signals: &[Signal], _hold: Duration) {}
        fn set_message(&mut self, _text: &str) {}
        fn set_status_text(&mut self, _text: &str) {}
        fn update_score(&mut self, _score: u32, _high_score: u32) {}
        fn set_light(&mut self, _state: LightState) {}
        fn game_over(&mut self, _score: u32) {}
    }

    impl SoundPlayer for Quiet {
        fn play(&mut self, _signal: Signal) -> Result<()> {
            Ok(())
        }
        fn play_start(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_autoplay_reaches_target_then_times_out() {
        let script = vec![Signal::Green, Signal::Blue, Signal::Red];
        let mut engine = Engine::new(
            Timings::default(),
            Box::new(ScriptedSignals::new(script)),
            Quiet,
            Quiet,
        );
        let mut bot = AutoPlayer::new(2);
        let mut now = Instant::now();
        let step = Duration::from_millis(50);
        let mut finished = false;

        for _ in 0..10_000 {
            engine.advance(now);
            match bot.next_move(&engine) {
                Some(AutoMove::Start) => {
                    engine.start(now);
                }
                Some(AutoMove::Press(s)) => {
                    assert!(engine.submit_input(s, now));
                }
                Some(AutoMove::Finished) => {
                    finished = true;
                    break;
                }
                None => {}
            }
            now += step;
        }

        assert!(finished);
        assert_eq!(engine.high_score(), 2);
        assert_eq!(engine.score(), 0);
    }
}
