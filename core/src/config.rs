//! 系统配置定义与解析

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};

use crate::signal::SIGNAL_COUNT;

/// 系统运行时配置
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Sys {
    /// 键位映射配置
    pub keys: Keys,
    /// 引擎节奏与计时配置
    pub engine: Timings,
    /// 运行循环配置
    pub runtime: Runtime,
}

/// 键位配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Keys {
    /// 4 个按键（绿、红、黄、蓝）对应的按键代码
    pub pads: Vec<String>,
    /// 开始游戏
    pub start: String,
    /// 中止游戏
    pub stop: String,
    /// 退出程序
    pub quit: String,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            pads: ["g", "r", "y", "b"].map(String::from).to_vec(),
            start: "s".to_string(),
            stop: "x".to_string(),
            quit: "q".to_string(),
        }
    }
}

/// 引擎计时配置
///
/// 提速规则固定：序列长度每到达 `speedup_lengths` 中的一个值，
/// 节拍间隔减少 `interval_step`，且不低于 `interval_floor`。
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Timings {
    /// 每局开始时的节拍间隔
    #[serde(rename = "baseline_interval_ms", deserialize_with = "de_duration_ms")]
    pub baseline_interval: Duration,
    /// 每次提速减少的间隔
    #[serde(rename = "interval_step_ms", deserialize_with = "de_duration_ms")]
    pub interval_step: Duration,
    /// 间隔下限
    #[serde(rename = "interval_floor_ms", deserialize_with = "de_duration_ms")]
    pub interval_floor: Duration,
    /// 触发提速的序列长度
    pub speedup_lengths: Vec<usize>,
    /// 等待输入的超时窗口（每次有效输入都会重新计时）
    #[serde(rename = "input_timeout_ms", deserialize_with = "de_duration_ms")]
    pub input_timeout: Duration,
    /// 开始游戏到第一轮之间的前奏
    #[serde(rename = "preamble_ms", deserialize_with = "de_duration_ms")]
    pub preamble: Duration,
    /// 完整复现后到下一轮之间的停顿
    #[serde(rename = "round_pause_ms", deserialize_with = "de_duration_ms")]
    pub round_pause: Duration,
    /// 失败动画的闪烁次数
    pub failure_pulses: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            baseline_interval: Duration::from_millis(1000),
            interval_step: Duration::from_millis(100),
            interval_floor: Duration::from_millis(250),
            speedup_lengths: vec![5, 9, 13],
            input_timeout: Duration::from_millis(5000),
            preamble: Duration::from_millis(800),
            round_pause: Duration::from_millis(850),
            failure_pulses: 5,
        }
    }
}

impl Timings {
    /// 序列长度达到 `len` 后的节拍间隔
    #[must_use]
    pub fn interval_after(&self, current: Duration, len: usize) -> Duration {
        if !self.speedup_lengths.contains(&len) {
            return current;
        }
        current
            .saturating_sub(self.interval_step)
            .max(self.interval_floor)
    }

    /// 检查计时参数
    ///
    /// # Errors
    ///
    /// - 间隔、超时或闪烁次数为零
    /// - 下限高于初始间隔
    pub fn validate(&self) -> Result<()> {
        if self.baseline_interval.is_zero() {
            bail!("engine.baseline_interval_ms 必须大于 0");
        }
        if self.interval_floor > self.baseline_interval {
            bail!(
                "engine.interval_floor_ms ({}) 不能高于 baseline_interval_ms ({})",
                self.interval_floor.as_millis(),
                self.baseline_interval.as_millis()
            );
        }
        if self.input_timeout.is_zero() {
            bail!("engine.input_timeout_ms 必须大于 0");
        }
        if self.failure_pulses == 0 {
            bail!("engine.failure_pulses 必须大于 0");
        }
        Ok(())
    }
}

/// 运行循环配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Runtime {
    /// 主循环推进间隔
    #[serde(rename = "tick_ms", deserialize_with = "de_duration_ms")]
    pub tick: Duration,
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(16),
        }
    }
}

impl Sys {
    /// 检查整体配置
    ///
    /// # Errors
    ///
    /// - 按键数量不为 4 或按键代码重复
    /// - 计时参数非法
    /// - 主循环间隔为零
    pub fn validate(&self) -> Result<()> {
        if self.keys.pads.len() != SIGNAL_COUNT {
            bail!(
                "keys.pads 需要 {} 个按键代码，实际为 {}",
                SIGNAL_COUNT,
                self.keys.pads.len()
            );
        }
        let mut seen = HashSet::new();
        let all = self
            .keys
            .pads
            .iter()
            .chain([&self.keys.start, &self.keys.stop, &self.keys.quit]);
        for code in all {
            if !seen.insert(code.to_lowercase()) {
                bail!("按键代码重复: {code}");
            }
        }
        self.engine.validate()?;
        if self.runtime.tick.is_zero() {
            bail!("runtime.tick_ms 必须大于 0");
        }
        Ok(())
    }
}

/// 从 TOML 字符串解析系统配置
///
/// # Errors
///
/// - TOML 解析失败
/// - 配置字段反序列化失败
/// - 配置校验失败
pub fn parse_sys_str(s: &str) -> Result<Sys> {
    let cfg: Sys = toml::from_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// 从指定路径加载系统配置（TOML）
///
/// # Errors
///
/// - 读取文件失败
/// - TOML 解析失败
/// - 配置字段反序列化或校验失败
pub fn load_sys(path: &Path) -> Result<Sys> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
    parse_sys_str(&s).with_context(|| format!("配置文件无效: {}", path.display()))
}

/// 反序列化毫秒为 `Duration`
fn de_duration_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}
