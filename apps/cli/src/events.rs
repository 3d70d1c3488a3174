//! 事件输出（JSON Lines）
//!
//! 序列器事件经 `EventRecorder` 投递到后台线程，逐行写入文件或 stdout。

use anyhow::{Context, Result, anyhow};
use mxrob_sdk::client::{CycleEvent, EventRecorder};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::thread::{self, JoinHandle};

/// 后台写入线程
pub struct EventWriter {
    handle: JoinHandle<io::Result<u64>>,
}

impl EventWriter {
    /// 启动写入线程（`-` 表示 stdout）
    ///
    /// 返回需要注册到序列器的录制钩子。
    pub fn spawn(path: &Path) -> Result<(EventRecorder, Self)> {
        let out: Box<dyn Write + Send> = if path == Path::new("-") {
            Box::new(io::stdout())
        } else {
            let file = File::create(path)
                .with_context(|| format!("Failed to create event log {}", path.display()))?;
            Box::new(file)
        };

        let (recorder, rx) = EventRecorder::new();
        let handle = thread::Builder::new()
            .name("mxrob-events".to_string())
            .spawn(move || write_lines(rx.iter(), out))
            .context("Failed to spawn event writer thread")?;
        Ok((recorder, Self { handle }))
    }

    /// 等待写入线程结束
    ///
    /// 调用前必须先释放序列器（关闭 Channel 发送端）。
    pub fn finish(self) -> Result<u64> {
        self.handle
            .join()
            .map_err(|_| anyhow!("Event writer thread panicked"))?
            .context("Failed to write event log")
    }
}

fn write_lines(
    events: impl Iterator<Item = CycleEvent>,
    out: Box<dyn Write + Send>,
) -> io::Result<u64> {
    let mut out = BufWriter::new(out);
    let mut count = 0;
    for event in events {
        serde_json::to_writer(&mut out, &event)?;
        out.write_all(b"\n")?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}
