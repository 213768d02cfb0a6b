//! # Pad Recall - 终端前端
//!
//! 在主线程上消费视觉消息并逐行输出到终端

mod app;

use std::io::Write;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;

pub use app::Screen;
use pad_recall::loops::VisualMsg;

/// 没有待熄灭高亮时的等待上限
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// 运行终端渲染循环，直到所有视觉消息发送端关闭
///
/// 返回已结束的局数。
///
/// # Errors
///
/// - 写入输出失败
pub fn run(visual_rx: mpsc::Receiver<VisualMsg>, mut out: impl Write) -> Result<u32> {
    let mut screen = Screen::new();
    loop {
        let wait = screen.wait(Instant::now(), IDLE_WAIT);
        match visual_rx.recv_timeout(wait) {
            Ok(msg) => {
                for line in screen.apply(msg, Instant::now()) {
                    writeln!(out, "{line}")?;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
        if let Some(line) = screen.expire(Instant::now()) {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
    }
    Ok(screen.games())
}
