//! # MXROB PV Transport Layer
//!
//! PV 传输抽象层，提供统一的读写接口。
//!
//! - [`CaToolsTransport`]: 调用 EPICS base 自带的 `caput`/`caget`
//! - [`SimulatedIoc`]: 进程内模拟的机械臂 IOC（无硬件调试、集成测试）
//! - `MockTransport`（feature `mock`）: 脚本化读值、故障注入、操作日志

use std::sync::Arc;
use thiserror::Error;

pub mod catools;
pub mod sim;

#[cfg(feature = "mock")]
pub mod mock;

pub use catools::CaToolsTransport;
pub use sim::{SimConfig, SimulatedIoc};

#[cfg(feature = "mock")]
pub use mock::{MockOp, MockTransport};

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// IOC 在超时时间内未回执
    #[error("Timeout on {pv} after {timeout_ms}ms")]
    Timeout { pv: String, timeout_ms: u64 },

    /// 无法连接到 PV（名称错误或 IOC 离线）
    #[error("PV not reachable: {pv}")]
    Disconnected { pv: String },

    /// IOC 拒绝写入
    #[error("Put to {pv} rejected: {message}")]
    Rejected { pv: String, message: String },

    /// 读回的值无法解析
    #[error("Unparsable value from {pv}: {raw:?}")]
    Parse { pv: String, raw: String },
}

impl TransportError {
    /// 对应的 PV 名称（IO 错误没有）
    pub fn pv(&self) -> Option<&str> {
        match self {
            TransportError::Io(_) => None,
            TransportError::Timeout { pv, .. }
            | TransportError::Disconnected { pv }
            | TransportError::Rejected { pv, .. }
            | TransportError::Parse { pv, .. } => Some(pv),
        }
    }
}

/// PV 读写接口
///
/// # 语义
///
/// - `put()` 阻塞直到 IOC 回执（put-callback），但回执不代表运动完成
/// - `get()` 每次都是一次新的读取，实现不得缓存
///
/// 接口使用 `&self`，实现需自行保证线程安全：操作员线程可能在序列器
/// 阻塞等待时并发写入 `StopMove`。
pub trait PvTransport: Send + Sync {
    /// 写入整数值并等待回执
    fn put(&self, pv: &str, value: i32) -> Result<(), TransportError>;

    /// 读取当前值
    fn get(&self, pv: &str) -> Result<f64, TransportError>;
}

impl<T: PvTransport + ?Sized> PvTransport for Arc<T> {
    fn put(&self, pv: &str, value: i32) -> Result<(), TransportError> {
        (**self).put(pv, value)
    }

    fn get(&self, pv: &str) -> Result<f64, TransportError> {
        (**self).get(pv)
    }
}

impl<T: PvTransport + ?Sized> PvTransport for Box<T> {
    fn put(&self, pv: &str, value: i32) -> Result<(), TransportError> {
        (**self).put(pv, value)
    }

    fn get(&self, pv: &str) -> Result<f64, TransportError> {
        (**self).get(pv)
    }
}
