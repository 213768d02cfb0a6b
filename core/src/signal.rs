//! 信号色板与信号来源
//!
//! - `Signal`：四个固定的按键（绿、红、黄、蓝）
//! - `SignalSource`：序列生成的注入点，游戏使用随机来源，测试使用脚本来源

use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// 色板大小
pub const SIGNAL_COUNT: usize = 4;

/// 单个可记忆的信号（按键）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// 绿色（0 号）
    Green,
    /// 红色（1 号）
    Red,
    /// 黄色（2 号）
    Yellow,
    /// 蓝色（3 号）
    Blue,
}

impl Signal {
    /// 按索引顺序排列的全部信号
    pub const ALL: [Self; SIGNAL_COUNT] = [Self::Green, Self::Red, Self::Yellow, Self::Blue];

    /// 信号在色板中的索引
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Green => 0,
            Self::Red => 1,
            Self::Yellow => 2,
            Self::Blue => 3,
        }
    }

    /// 由索引取得信号，越界返回 `None`
    #[must_use]
    pub const fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::Green),
            1 => Some(Self::Red),
            2 => Some(Self::Yellow),
            3 => Some(Self::Blue),
            _ => None,
        }
    }

    /// 小写名称
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
        }
    }

    /// 按键音频率（Hz）
    #[must_use]
    pub const fn tone_hz(self) -> f32 {
        match self {
            Self::Green => 415.0,
            Self::Red => 310.0,
            Self::Yellow => 252.0,
            Self::Blue => 209.0,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 序列信号来源
///
/// 每轮开始时引擎调用一次 `next_signal`，结果追加到序列末尾。
pub trait SignalSource: Send {
    /// 取下一个信号
    fn next_signal(&mut self) -> Signal;
}

/// 均匀随机信号来源（允许重复，与历史无关）
pub struct RandomSignals {
    /// 随机数生成器
    rng: StdRng,
}

impl RandomSignals {
    /// 以系统熵初始化
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// 以固定种子初始化，结果可复现
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSource for RandomSignals {
    fn next_signal(&mut self) -> Signal {
        let idx = self.rng.gen_range(0..SIGNAL_COUNT);
        Signal::from_index(idx).unwrap_or(Signal::Green)
    }
}

/// 脚本信号来源：循环给出固定序列
pub struct ScriptedSignals {
    /// 脚本内容
    script: Vec<Signal>,
    /// 下一个读取位置
    cursor: usize,
}

impl ScriptedSignals {
    /// 由给定脚本创建；空脚本退化为始终给出 `Signal::Green`
    #[must_use]
    pub fn new(script: Vec<Signal>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl SignalSource for ScriptedSignals {
    fn next_signal(&mut self) -> Signal {
        let Some(signal) = self.script.get(self.cursor).copied() else {
            return Signal::Green;
        };
        self.cursor = (self.cursor + 1) % self.script.len();
        signal
    }
}
