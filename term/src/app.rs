//! 终端画面状态与逐行输出

use std::time::{Duration, Instant};

use pad_recall::loops::VisualMsg;
use pad_recall::{LightState, Signal};

/// 终端画面
#[derive(Debug, Default)]
pub struct Screen {
    /// 当前高亮的信号
    lit: Vec<Signal>,
    /// 高亮熄灭时刻
    lit_until: Option<Instant>,
    /// 上一次输出的按键行，用于去重
    last_pads: String,
    /// 已结束的局数
    games: u32,
}

impl Screen {
    /// 创建空画面
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 已结束的局数
    #[must_use]
    pub const fn games(&self) -> u32 {
        self.games
    }

    /// 下一次需要自行刷新的时刻
    #[must_use]
    pub const fn wake_at(&self) -> Option<Instant> {
        self.lit_until
    }

    /// 应用一条视觉消息，返回需要输出的行
    pub fn apply(&mut self, msg: VisualMsg, now: Instant) -> Vec<String> {
        match msg {
            VisualMsg::Flash { signals, hold } => {
                self.lit = signals;
                self.lit_until = Some(now.checked_add(hold).unwrap_or(now));
                self.pads_line().into_iter().collect()
            }
            VisualMsg::Message(text) => vec![text],
            VisualMsg::Status(text) => vec![format!("[{text}]")],
            VisualMsg::Score { score, high_score } => {
                vec![format!("score: {score:02}  best: {high_score:02}")]
            }
            VisualMsg::Light(state) => {
                let s = match state {
                    LightState::On => "on",
                    LightState::Off => "off",
                };
                vec![format!("light: {s}")]
            }
            VisualMsg::GameOver { score } => {
                self.games = self.games.saturating_add(1);
                vec![format!("*** GAME OVER ({score}) ***")]
            }
        }
    }

    /// 熄灭到期的高亮，返回需要输出的行
    pub fn expire(&mut self, now: Instant) -> Option<String> {
        let until = self.lit_until?;
        if now < until {
            return None;
        }
        self.lit.clear();
        self.lit_until = None;
        self.pads_line()
    }

    /// 距离下一次刷新的等待时间
    #[must_use]
    pub fn wait(&self, now: Instant, idle: Duration) -> Duration {
        self.lit_until
            .map_or(idle, |until| until.saturating_duration_since(now))
    }

    /// 按键行；与上一次相同则不输出
    fn pads_line(&mut self) -> Option<String> {
        let line = Signal::ALL
            .iter()
            .map(|s| {
                if self.lit.contains(s) {
                    format!("[{}]", s.name().to_uppercase())
                } else {
                    format!(" {} ", s.name().to_lowercase())
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        if line == self.last_pads {
            return None;
        }
        self.last_pads.clone_from(&line);
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_lights_then_clears() {
        let t0 = Instant::now();
        let mut screen = Screen::new();
        let lines = screen.apply(
            VisualMsg::Flash {
                signals: vec![Signal::Red],
                hold: Duration::from_millis(500),
            },
            t0,
        );
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[RED]"));
        assert_eq!(screen.wake_at(), Some(t0 + Duration::from_millis(500)));

        assert_eq!(screen.expire(t0 + Duration::from_millis(499)), None);
        let cleared = screen.expire(t0 + Duration::from_millis(500)).unwrap();
        assert!(!cleared.contains('['));
        assert_eq!(screen.wake_at(), None);
    }

    #[test]
    fn test_text_messages() {
        let t0 = Instant::now();
        let mut screen = Screen::new();
        assert_eq!(
            screen.apply(VisualMsg::Message("Your turn!".into()), t0),
            vec!["Your turn!".to_string()]
        );
        assert_eq!(
            screen.apply(
                VisualMsg::Score {
                    score: 2,
                    high_score: 12
                },
                t0
            ),
            vec!["score: 02  best: 12".to_string()]
        );
        screen.apply(VisualMsg::GameOver { score: 2 }, t0);
        assert_eq!(screen.games(), 1);
    }

    #[test]
    fn test_wait_until_flash_expires() {
        let t0 = Instant::now();
        let mut screen = Screen::new();
        let idle = Duration::from_secs(1);
        assert_eq!(screen.wait(t0, idle), idle);
        screen.apply(
            VisualMsg::Flash {
                signals: Signal::ALL.to_vec(),
                hold: Duration::from_millis(100),
            },
            t0,
        );
        assert_eq!(screen.wait(t0, idle), Duration::from_millis(100));
    }
}
