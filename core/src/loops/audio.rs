//! 音频播放循环
//!
//! - 在独立线程上接收播放请求
//! - 启用 `rodio` 特性时合成正弦波按键音；否则只记录日志
//! - 音频设备不可用时继续消费请求，游戏照常进行

use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, warn};

use crate::presenter::SoundPlayer;
use crate::signal::Signal;

/// 按键音时长
pub const TONE_LENGTH: Duration = Duration::from_millis(250);

/// 开局提示音频率（Hz）
const START_CHIME_HZ: f32 = 523.0;

/// 音频循环消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    /// 播放信号对应的按键音
    Tone(Signal),
    /// 播放开局提示音
    StartChime,
}

impl Msg {
    /// 消息对应的频率（Hz）
    #[must_use]
    pub const fn frequency(self) -> f32 {
        match self {
            Self::Tone(signal) => signal.tone_hz(),
            Self::StartChime => START_CHIME_HZ,
        }
    }
}

#[cfg(feature = "rodio")]
mod backend {
    use anyhow::Result;
    use rodio::Source;
    use rodio::source::SineWave;
    use rodio::stream::OutputStream;

    use super::TONE_LENGTH;

    /// 音频后端
    pub struct Audio {
        /// 音频输出流
        stream: OutputStream,
    }

    impl Audio {
        /// 打开默认输出设备
        pub fn new() -> Result<Self> {
            let mut stream = rodio::OutputStreamBuilder::open_default_stream()?;
            stream.log_on_drop(false);
            Ok(Self { stream })
        }

        /// 混入一段正弦波
        pub fn play(&self, freq: f32) {
            let source = SineWave::new(freq).take_duration(TONE_LENGTH).amplify(0.2);
            self.stream.mixer().add(source);
        }
    }
}

#[cfg(not(feature = "rodio"))]
mod backend {
    use anyhow::Result;
    use tracing::debug;

    /// 静音后端
    pub struct Audio;

    impl Audio {
        /// 静音后端总是可用
        #[allow(clippy::unnecessary_wraps)]
        pub const fn new() -> Result<Self> {
            Ok(Self)
        }

        /// 只记录请求
        pub fn play(&self, freq: f32) {
            debug!(freq, "静音模式：跳过播放");
        }
    }
}

/// 音频循环：阻塞接收请求直到所有发送端关闭
pub fn run_audio_loop(rx: mpsc::Receiver<Msg>) {
    let audio = match backend::Audio::new() {
        Ok(a) => Some(a),
        Err(e) => {
            warn!("音频设备不可用，按键音将被忽略: {e:#}");
            None
        }
    };
    let mut played: u64 = 0;
    while let Ok(msg) = rx.recv() {
        let Some(audio) = audio.as_ref() else {
            continue;
        };
        audio.play(msg.frequency());
        played = played.saturating_add(1);
    }
    debug!(played, "音频循环结束");
}

/// 通过通道向音频循环转发请求的声音端
#[derive(Debug, Clone)]
pub struct ChannelSound {
    /// 音频请求发送端
    tx: mpsc::SyncSender<Msg>,
}

impl ChannelSound {
    /// 包装音频请求发送端
    #[must_use]
    pub const fn new(tx: mpsc::SyncSender<Msg>) -> Self {
        Self { tx }
    }

    fn send(&self, msg: Msg) -> Result<()> {
        self.tx.try_send(msg).map_err(|e| match e {
            mpsc::TrySendError::Full(_) => anyhow!("音频队列已满，丢弃 {msg:?}"),
            mpsc::TrySendError::Disconnected(_) => anyhow!("音频循环已退出"),
        })
    }
}

impl SoundPlayer for ChannelSound {
    fn play(&mut self, signal: Signal) -> Result<()> {
        self.send(Msg::Tone(signal))
    }

    fn play_start(&mut self) -> Result<()> {
        self.send(Msg::StartChime)
    }
}
