//! 引擎的外部协作者：显示与声音
//!
//! 两者都只是副作用出口，不能修改引擎状态。
//! 声音播放失败以 `Err` 返回，由引擎记录日志后忽略。

use std::time::Duration;

use anyhow::Result;

use crate::signal::Signal;

/// 阶段指示灯
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    /// 游戏进行中
    On,
    /// 空闲
    Off,
}

/// 显示端
pub trait Presenter {
    /// 高亮一组信号，`hold` 之后由显示端自行熄灭
    fn flash(&mut self, signals: &[Signal], hold: Duration);

    /// 更新提示消息
    fn set_message(&mut self, text: &str);

    /// 更新状态文字
    fn set_status_text(&mut self, text: &str);

    /// 更新分数与最高分
    fn update_score(&mut self, score: u32, high_score: u32);

    /// 更新阶段指示灯
    fn set_light(&mut self, state: LightState);

    /// 通知游戏结束及最终分数
    fn game_over(&mut self, score: u32);
}

/// 声音端（尽力而为）
pub trait SoundPlayer {
    /// 播放信号对应的按键音
    ///
    /// # Errors
    ///
    /// 播放请求无法送达时返回错误，引擎只记录日志
    fn play(&mut self, signal: Signal) -> Result<()>;

    /// 播放开局提示音
    ///
    /// # Errors
    ///
    /// 播放请求无法送达时返回错误，引擎只记录日志
    fn play_start(&mut self) -> Result<()>;
}
