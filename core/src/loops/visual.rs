//! 通过通道转发显示请求的显示端
//!
//! 引擎运行在主循环线程，真正的绘制在前端线程完成。
//! 队列满或前端已退出时丢弃消息，不阻塞引擎。

use std::sync::mpsc;
use std::time::Duration;

use tracing::warn;

use crate::loops::VisualMsg;
use crate::presenter::{LightState, Presenter};
use crate::signal::Signal;

/// 把 `Presenter` 调用转换为 `VisualMsg` 的显示端
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    tx: mpsc::SyncSender<VisualMsg>,
    /// 已丢弃的消息数
    dropped: u64,
}

impl ChannelPresenter {
    /// 包装视觉消息发送端
    #[must_use]
    pub const fn new(tx: mpsc::SyncSender<VisualMsg>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// 已丢弃的消息数
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    fn send(&mut self, msg: VisualMsg) {
        if let Err(e) = self.tx.try_send(msg) {
            self.dropped = self.dropped.saturating_add(1);
            match e {
                mpsc::TrySendError::Full(msg) => warn!(?msg, "视觉队列已满，丢弃消息"),
                mpsc::TrySendError::Disconnected(_) => {
                    // 前端退出后只在首次记录
                    if self.dropped == 1 {
                        warn!("视觉循环已退出");
                    }
                }
            }
        }
    }
}

impl Presenter for ChannelPresenter {
    fn flash(&mut self, signals: &[Signal], hold: Duration) {
        self.send(VisualMsg::Flash {
            signals: signals.to_vec(),
            hold,
        });
    }

    fn set_message(&mut self, text: &str) {
        self.send(VisualMsg::Message(text.to_owned()));
    }

    fn set_status_text(&mut self, text: &str) {
        self.send(VisualMsg::Status(text.to_owned()));
    }

    fn update_score(&mut self, score: u32, high_score: u32) {
        self.send(VisualMsg::Score { score, high_score });
    }

    fn set_light(&mut self, state: LightState) {
        self.send(VisualMsg::Light(state));
    }

    fn game_over(&mut self, score: u32) {
        self.send(VisualMsg::GameOver { score });
    }
}
