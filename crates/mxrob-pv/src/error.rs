//! 协议层错误类型定义

use crate::names::PvName;
use thiserror::Error;

/// PV 编码/解码错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PvError {
    /// 标志位 PV 读到了 0/1 以外的值
    #[error("Invalid flag value on {pv}: {value} (expected 0 or 1)")]
    InvalidFlag { pv: PvName, value: f64 },

    /// 样品位索引无效（必须为正整数）
    #[error("Invalid loop index: {0} (must be a positive integer)")]
    InvalidLoopIndex(i64),

    /// 写入值超出 PV 可表示范围
    #[error("Value {value} out of range for {pv}")]
    ValueOutOfRange { pv: PvName, value: u64 },

    /// 枚举型 PV 读到了未定义的值
    #[error("Unknown value {value} for {pv}")]
    UnknownValue { pv: PvName, value: i32 },

    /// 无法识别的 PV 记录名
    #[error("Unknown PV record: {0}")]
    UnknownRecord(String),
}
