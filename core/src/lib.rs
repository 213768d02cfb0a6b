//! Pad Recall 核心库：序列记忆游戏引擎与运行时循环

pub mod autoplay;
pub mod config;
pub mod engine;
pub mod logging;
pub mod loops;
pub mod presenter;
pub mod schedule;
pub mod signal;
pub mod state;

pub use engine::{Engine, FailureCause};
pub use presenter::{LightState, Presenter, SoundPlayer};
pub use signal::{RandomSignals, ScriptedSignals, Signal, SignalSource};
pub use state::{GameState, Phase};
