//! 事件循环模块入口
//!
//! 提供四个子模块：
//! - `audio`：按键音播放循环
//! - `key_map`：按键映射模块
//! - `main_loop`：按固定间隔推进引擎并分发输入
//! - `visual`：通过通道转发显示请求的显示端

pub mod audio;
pub mod key_map;
pub mod main_loop;
pub mod visual;

use std::time::Duration;

use crate::presenter::LightState;
use crate::signal::Signal;

/// 原始按键代码（平台无关表示）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawKeyCode(pub String);

/// 原始输入消息（从前端传递到 core）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInputMsg {
    /// 按键按下
    Key(RawKeyCode),
}

/// 输入事件消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMsg {
    /// 按下某个信号按键
    Pad(Signal),
    /// 开始游戏
    Start,
    /// 中止游戏
    Stop,
    /// 退出程序
    Quit,
}

/// 视觉循环消息
#[derive(Debug, Clone, PartialEq)]
pub enum VisualMsg {
    /// 高亮一组信号，持续 `hold` 后熄灭
    Flash {
        /// 被高亮的信号
        signals: Vec<Signal>,
        /// 高亮持续时间
        hold: Duration,
    },
    /// 提示消息
    Message(String),
    /// 状态文字
    Status(String),
    /// 分数面板
    Score {
        /// 当前分数
        score: u32,
        /// 最高分
        high_score: u32,
    },
    /// 阶段指示灯
    Light(LightState),
    /// 游戏结束
    GameOver {
        /// 最终分数
        score: u32,
    },
}
