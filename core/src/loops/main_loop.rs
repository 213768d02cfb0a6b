//! 主循环：推进引擎并分发输入
//!
//! - 以固定间隔调用 `Engine::advance`
//! - 将原始输入经按键映射转换后交给引擎
//! - 自动演奏模式下由 `AutoPlayer` 代替玩家输入

use std::{
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::autoplay::{AutoMove, AutoPlayer};
use crate::engine::Engine;
use crate::loops::key_map::KeyMap;
use crate::loops::{InputMsg, RawInputMsg};
use crate::presenter::{Presenter, SoundPlayer};

/// 主循环参数
pub struct LoopParams {
    /// 推进间隔
    pub tick: Duration,
    /// 自动演奏者；为 `None` 时等待玩家输入
    pub autoplay: Option<AutoPlayer>,
}

/// 运行主循环，直到收到退出请求或自动演奏结束
///
/// - `engine`：序列记忆引擎
/// - `raw_input_rx`：原始输入消息接收端；交互模式下发送端全部关闭视为退出
/// - `key_map`：按键映射器
///
/// 返回本次会话的最高分。
pub fn run<P: Presenter, S: SoundPlayer>(
    mut engine: Engine<P, S>,
    raw_input_rx: mpsc::Receiver<RawInputMsg>,
    key_map: KeyMap,
    params: LoopParams,
) -> u32 {
    let LoopParams { tick, mut autoplay } = params;
    let started_at = Instant::now();
    let mut last_log_sec: u64 = 0;
    let mut inputs_this_sec: u32 = 0;
    let mut tasks_this_sec: usize = 0;
    let mut next_tick = Instant::now();
    'main: loop {
        let Some(t) = next_tick.checked_add(tick) else {
            next_tick = Instant::now();
            continue;
        };
        next_tick = t;
        let now_instant = Instant::now();
        if let Some(wait) = next_tick.checked_duration_since(now_instant) {
            thread::sleep(wait);
        } else {
            next_tick = now_instant;
        }

        let now = Instant::now();
        // 先推进到当前时刻，再处理本帧输入
        tasks_this_sec = tasks_this_sec.saturating_add(engine.advance(now));
        loop {
            match raw_input_rx.try_recv() {
                Ok(raw_msg) => {
                    let Some(input_msg) = key_map.convert(raw_msg) else {
                        continue;
                    };
                    inputs_this_sec = inputs_this_sec.saturating_add(1);
                    match input_msg {
                        InputMsg::Pad(signal) => {
                            engine.submit_input(signal, now);
                        }
                        InputMsg::Start => {
                            engine.start(now);
                        }
                        InputMsg::Stop => {
                            engine.stop();
                        }
                        InputMsg::Quit => {
                            info!("收到退出请求");
                            break 'main;
                        }
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if autoplay.is_none() {
                        info!("输入源已关闭");
                        break 'main;
                    }
                    break;
                }
            }
        }

        if let Some(bot) = autoplay.as_mut() {
            match bot.next_move(&engine) {
                Some(AutoMove::Start) => {
                    engine.start(now);
                }
                Some(AutoMove::Press(signal)) => {
                    engine.submit_input(signal, now);
                }
                Some(AutoMove::Finished) => {
                    info!(high_score = engine.high_score(), "自动演奏结束");
                    break 'main;
                }
                None => {}
            }
        }

        let sec = now.saturating_duration_since(started_at).as_secs();
        if sec != last_log_sec {
            debug!(
                elapsed_sec = sec,
                phase = engine.phase().as_str(),
                sequence_len = engine.sequence().len(),
                interval_ms = u64::try_from(engine.interval().as_millis()).unwrap_or(u64::MAX),
                inputs = inputs_this_sec,
                tasks = tasks_this_sec,
                "主循环性能统计"
            );
            inputs_this_sec = 0;
            tasks_this_sec = 0;
            last_log_sec = sec;
        }
    }
    engine.stop();
    engine.high_score()
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::config::{Keys, Timings};
    use crate::loops::RawKeyCode;
    use crate::presenter::LightState;
    use crate::signal::{ScriptedSignals, Signal};

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

    fn fast_engine() -> Engine<Quiet, Quiet> {
        let timings = Timings {
            baseline_interval: Duration::from_millis(10),
            interval_step: Duration::from_millis(1),
            interval_floor: Duration::from_millis(5),
            input_timeout: Duration::from_millis(300),
            preamble: Duration::from_millis(5),
            round_pause: Duration::from_millis(5),
            failure_pulses: 1,
            ..Timings::default()
        };
        Engine::new(
            timings,
            Box::new(ScriptedSignals::new(vec![Signal::Red, Signal::Blue])),
            Quiet,
            Quiet,
        )
    }

    #[test]
    fn test_quit_key_ends_loop() {
        let (tx, rx) = mpsc::sync_channel(8);
        tx.send(RawInputMsg::Key(RawKeyCode("s".into()))).unwrap();
        tx.send(RawInputMsg::Key(RawKeyCode("q".into()))).unwrap();
        let params = LoopParams {
            tick: Duration::from_millis(1),
            autoplay: None,
        };
        let high = run(fast_engine(), rx, KeyMap::new(&Keys::default()), params);
        assert_eq!(high, 0);
        drop(tx);
    }

    #[test]
    fn test_closed_input_ends_interactive_loop() {
        let (tx, rx) = mpsc::sync_channel::<RawInputMsg>(1);
        drop(tx);
        let params = LoopParams {
            tick: Duration::from_millis(1),
            autoplay: None,
        };
        assert_eq!(
            run(fast_engine(), rx, KeyMap::new(&Keys::default()), params),
            0
        );
    }

    #[test]
    fn test_autoplay_runs_until_game_over() {
        let (tx, rx) = mpsc::sync_channel::<RawInputMsg>(1);
        drop(tx);
        let params = LoopParams {
            tick: Duration::from_millis(1),
            autoplay: Some(AutoPlayer::new(2)),
        };
        assert_eq!(
            run(fast_engine(), rx, KeyMap::new(&Keys::default()), params),
            2
        );
    }
}
