//! 驱动层错误类型定义

use mxrob_pv::PvError;
use mxrob_transport::TransportError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 传输层错误（写入未回执、PV 不可达等）
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// PV 编码/解码错误
    #[error("PV error: {0}")]
    Pv(#[from] PvError),

    /// 后端配置无效
    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),
}

impl DriverError {
    /// 是否为 IOC 明确拒绝的命令
    pub fn is_rejected(&self) -> bool {
        matches!(self, DriverError::Transport(TransportError::Rejected { .. }))
    }
}
