//! 错误类型体系
//!
//! - [`MonitorError`]: 运动监视器的等待失败
//! - [`CycleError`]: 循环失败，总是携带失败的步骤和样品位
//! - [`BatchError`]: 批量运行中电源控制失败
//! - [`ConfigError`]: 配置文件读写/校验失败
//!
//! 循环失败后不做任何自动重试，也不改变电源状态。

use crate::cancel::Cancelled;
use crate::types::CycleStep;
use mxrob_driver::DriverError;
use mxrob_pv::LoopIndex;
use std::path::PathBuf;
use thiserror::Error;

/// 运动监视器错误
#[derive(Debug, Error)]
pub enum MonitorError {
    /// 运动在超时时间内未完成（不计暂停时间）
    #[error("Motion did not complete within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// 取消令牌被触发
    #[error("Wait aborted by cancel request")]
    Aborted,

    /// 状态读取失败或读回非法值
    #[error("Status read failed: {0}")]
    Status(#[from] DriverError),
}

impl From<Cancelled> for MonitorError {
    fn from(_: Cancelled) -> Self {
        MonitorError::Aborted
    }
}

/// 循环错误
#[derive(Debug, Error)]
pub enum CycleError {
    // ==================== 命令下发 ====================
    /// 命令被拒绝或未回执
    #[error("Step {step} of loop {loop_index}: command dispatch failed: {source}")]
    CommandDispatch {
        step: CycleStep,
        loop_index: LoopIndex,
        #[source]
        source: DriverError,
    },

    // ==================== 运动等待 ====================
    /// 运动超时
    #[error("Step {step} of loop {loop_index}: motion did not complete within {timeout_ms}ms")]
    MotionTimeout {
        step: CycleStep,
        loop_index: LoopIndex,
        timeout_ms: u64,
    },

    /// 状态读取失败（包括非法标志值）
    #[error("Step {step} of loop {loop_index}: status read failed: {source}")]
    StatusRead {
        step: CycleStep,
        loop_index: LoopIndex,
        #[source]
        source: DriverError,
    },

    // ==================== 取消 ====================
    /// 操作员取消（Ctrl-C 或取消令牌）
    #[error("Step {step} of loop {loop_index}: aborted by operator")]
    OperatorAbort {
        step: CycleStep,
        loop_index: LoopIndex,
    },
}

impl CycleError {
    /// 失败的步骤
    pub fn step(&self) -> CycleStep {
        match self {
            CycleError::CommandDispatch { step, .. }
            | CycleError::MotionTimeout { step, .. }
            | CycleError::StatusRead { step, .. }
            | CycleError::OperatorAbort { step, .. } => *step,
        }
    }

    /// 失败的样品位
    pub fn loop_index(&self) -> LoopIndex {
        match self {
            CycleError::CommandDispatch { loop_index, .. }
            | CycleError::MotionTimeout { loop_index, .. }
            | CycleError::StatusRead { loop_index, .. }
            | CycleError::OperatorAbort { loop_index, .. } => *loop_index,
        }
    }

    /// 是否由取消请求导致
    pub fn is_abort(&self) -> bool {
        matches!(self, CycleError::OperatorAbort { .. })
    }

    /// 把监视器错误附上步骤上下文
    pub(crate) fn from_monitor(step: CycleStep, loop_index: LoopIndex, err: MonitorError) -> Self {
        match err {
            MonitorError::Timeout { timeout_ms } => CycleError::MotionTimeout {
                step,
                loop_index,
                timeout_ms,
            },
            MonitorError::Aborted => CycleError::OperatorAbort { step, loop_index },
            MonitorError::Status(source) => CycleError::StatusRead {
                step,
                loop_index,
                source,
            },
        }
    }
}

/// 批量运行错误
///
/// 单个循环的失败记录在 `BatchReport` 中，不走这里。
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to power on arm: {0}")]
    PowerOn(#[source] DriverError),

    #[error("Failed to power off arm: {0}")]
    PowerOff(#[source] DriverError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
