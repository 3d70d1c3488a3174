//! EPICS 命令行工具适配器
//!
//! 通过 `caput`/`caget` 访问 IOC，不需要链接 Channel Access 库，
//! 只要求 EPICS base 的工具在 `PATH` 中（或显式指定路径）。
//!
//! | 操作    | 命令                                   |
//! |---------|----------------------------------------|
//! | `put()` | `caput -c -w <timeout> -t <pv> <value>` |
//! | `get()` | `caget -t -n -w <timeout> <pv>`         |
//!
//! `caput -c` 使用 put-callback，IOC 处理完记录后才返回，对应
//! "写入并等待回执"的语义。

use crate::{PvTransport, TransportError};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::Duration;
use tracing::trace;

/// 默认回执超时
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// 基于 `caput`/`caget` 的传输
#[derive(Debug, Clone)]
pub struct CaToolsTransport {
    caput: PathBuf,
    caget: PathBuf,
    timeout: Duration,
}

impl CaToolsTransport {
    /// 使用 `PATH` 中的 `caput`/`caget`
    pub fn new() -> Self {
        Self {
            caput: PathBuf::from("caput"),
            caget: PathBuf::from("caget"),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// 显式指定工具路径
    pub fn with_tools(caput: impl Into<PathBuf>, caget: impl Into<PathBuf>) -> Self {
        Self {
            caput: caput.into(),
            caget: caget.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// 设置回执/连接超时（传给 `-w`）
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn wait_arg(&self) -> String {
        format!("{:.3}", self.timeout.as_secs_f64())
    }

    fn run(&self, mut command: Command, pv: &str) -> Result<String, TransportError> {
        let output = command.output()?;
        check_output(&output, pv, self.timeout)
    }
}

impl Default for CaToolsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PvTransport for CaToolsTransport {
    fn put(&self, pv: &str, value: i32) -> Result<(), TransportError> {
        trace!(pv, value, "caput");
        let mut command = Command::new(&self.caput);
        command
            .args(["-c", "-w"])
            .arg(self.wait_arg())
            .arg("-t")
            .arg(pv)
            .arg(value.to_string());
        self.run(command, pv).map(|_| ())
    }

    fn get(&self, pv: &str) -> Result<f64, TransportError> {
        let mut command = Command::new(&self.caget);
        command.args(["-t", "-n", "-w"]).arg(self.wait_arg()).arg(pv);
        let stdout = self.run(command, pv)?;
        let value = parse_value(pv, &stdout)?;
        trace!(pv, value, "caget");
        Ok(value)
    }
}

/// 检查进程退出状态并归类错误
///
/// CA 工具会把连接失败打印到 stdout 或 stderr（视版本而定），两者都要看。
fn check_output(output: &Output, pv: &str, timeout: Duration) -> Result<String, TransportError> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() && !looks_like_failure(&stdout) {
        return Ok(stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = format!("{} {}", stdout.trim(), stderr.trim()).trim().to_string();
    Err(classify_failure(pv, &message, timeout))
}

fn looks_like_failure(stdout: &str) -> bool {
    stdout.contains("not found") || stdout.contains("timed out")
}

fn classify_failure(pv: &str, message: &str, timeout: Duration) -> TransportError {
    if message.contains("not found") || message.contains("Channel connect timed out") {
        TransportError::Disconnected { pv: pv.to_string() }
    } else if message.contains("timed out") || message.contains("timeout") {
        TransportError::Timeout {
            pv: pv.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        TransportError::Rejected {
            pv: pv.to_string(),
            message: message.to_string(),
        }
    }
}

/// 解析 `caget -t -n` 的输出
fn parse_value(pv: &str, stdout: &str) -> Result<f64, TransportError> {
    let raw = stdout.trim();
    raw.parse::<f64>().map_err(|_| TransportError::Parse {
        pv: pv.to_string(),
        raw: raw.to_string(),
    })
}
