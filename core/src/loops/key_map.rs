//! 按键映射：将原始按键代码转换为游戏输入
//!
//! 负责维护配置的键位映射关系，并将原始输入事件转换为游戏逻辑输入。

use std::collections::HashMap;

use crate::config::Keys;
use crate::loops::{InputMsg, RawInputMsg, RawKeyCode};
use crate::signal::Signal;

/// 按键映射器
pub struct KeyMap {
    /// 按键代码字符串到输入的映射
    map: HashMap<String, InputMsg>,
}

impl KeyMap {
    /// 从键位配置创建映射器
    ///
    /// `keys.pads` 按顺序对应 `Signal::ALL`，多余的按键代码被忽略。
    /// 按键代码不区分大小写。
    #[must_use]
    pub fn new(keys: &Keys) -> Self {
        let mut map = HashMap::new();
        for (code, signal) in keys.pads.iter().zip(Signal::ALL) {
            map.insert(code.to_lowercase(), InputMsg::Pad(signal));
        }
        map.insert(keys.start.to_lowercase(), InputMsg::Start);
        map.insert(keys.stop.to_lowercase(), InputMsg::Stop);
        map.insert(keys.quit.to_lowercase(), InputMsg::Quit);
        Self { map }
    }

    /// 将原始输入消息转换为语义化输入消息
    ///
    /// 如果按键代码在映射中存在，返回对应的 `InputMsg`；否则返回 `None`
    #[must_use]
    pub fn convert(&self, raw_msg: RawInputMsg) -> Option<InputMsg> {
        match raw_msg {
            RawInputMsg::Key(RawKeyCode(code)) => self.map.get(&code.to_lowercase()).copied(),
        }
    }
}
