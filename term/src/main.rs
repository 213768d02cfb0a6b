//! # Pad Recall 主程序

use std::{
    io::BufRead,
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::info;

use pad_recall::{
    Engine, RandomSignals,
    autoplay::AutoPlayer,
    config::{Sys, load_sys},
    logging,
    loops::{
        RawInputMsg, RawKeyCode, VisualMsg, audio, key_map::KeyMap, main_loop, visual,
    },
};

/// 默认配置文件
const DEFAULT_CONFIG: &str = "config_sys.toml";

#[derive(Parser)]
/// 命令行参数
struct ExecArgs {
    #[arg(long)]
    /// 配置文件路径（默认读取 `config_sys.toml`，不存在时使用内置默认值）
    config: Option<PathBuf>,
    #[arg(long)]
    /// 随机种子，用于复现信号序列
    seed: Option<u64>,
    #[arg(long, value_name = "ROUNDS")]
    /// 自动演奏：完成指定轮数后停止作答，游戏结束后退出
    autoplay: Option<u32>,
}

/// 按命令行参数加载配置
fn load_config(path: Option<&Path>) -> Result<Sys> {
    if let Some(path) = path {
        return load_sys(path);
    }
    let default = Path::new(DEFAULT_CONFIG);
    if default.exists() {
        load_sys(default)
    } else {
        info!("未找到 {DEFAULT_CONFIG}，使用内置默认配置");
        Ok(Sys::default())
    }
}

/// 从标准输入读取以空白分隔的按键代码
fn read_stdin(raw_input_tx: mpsc::SyncSender<RawInputMsg>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        for code in line.split_whitespace() {
            if raw_input_tx
                .send(RawInputMsg::Key(RawKeyCode(code.to_string())))
                .is_err()
            {
                return;
            }
        }
    }
}

fn main() -> Result<()> {
    let args = ExecArgs::parse();
    logging::init_logging();
    let sys = load_config(args.config.as_deref())?;

    let (visual_tx, visual_rx) = mpsc::sync_channel::<VisualMsg>(256);
    let (raw_input_tx, raw_input_rx) = mpsc::sync_channel::<RawInputMsg>(64);
    let (audio_tx, audio_rx) = mpsc::sync_channel::<audio::Msg>(64);

    let _audio_thread = thread::spawn(move || {
        audio::run_audio_loop(audio_rx);
    });

    let signals = match args.seed {
        Some(seed) => RandomSignals::with_seed(seed),
        None => RandomSignals::new(),
    };
    let engine = Engine::new(
        sys.engine.clone(),
        Box::new(signals),
        visual::ChannelPresenter::new(visual_tx),
        audio::ChannelSound::new(audio_tx),
    );
    let key_map = KeyMap::new(&sys.keys);
    let autoplay = args.autoplay.map(AutoPlayer::new);
    if autoplay.is_none() {
        println!(
            "keys: pads {} | start {} | stop {} | quit {}",
            sys.keys.pads.join(" "),
            sys.keys.start,
            sys.keys.stop,
            sys.keys.quit
        );
        let _input_thread = thread::spawn(move || read_stdin(raw_input_tx));
    } else {
        drop(raw_input_tx);
    }

    let params = main_loop::LoopParams {
        tick: sys.runtime.tick,
        autoplay,
    };
    let main_thread = thread::spawn(move || main_loop::run(engine, raw_input_rx, key_map, params));

    let games = pad_recall_term::run(visual_rx, std::io::stdout().lock())?;
    let high_score = main_thread
        .join()
        .map_err(|_| anyhow!("主循环线程异常退出"))?;
    info!(games, high_score, "会话结束");
    println!("best score: {high_score}");
    Ok(())
}
