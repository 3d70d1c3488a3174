//! PV 取值编码
//!
//! 取值约定沿用 IOC 的定义：
//!
//! | 记录          | 0        | 1          |
//! |---------------|----------|------------|
//! | `Power`       | 断电     | 上电       |
//! | `Gripper`     | 闭合     | 张开       |
//! | `CheckMoving` | 静止     | 运动中     |
//! | `StopMove`    | 允许运动 | 请求停止   |

use crate::error::PvError;
use crate::names::PvName;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use std::num::NonZeroU32;

/// 放置目标：光束位
///
/// `PlaceLoop` 的参数不是样品位，而是目标位置；0 表示"当前光束位"。
pub const BEAM_POSITION: u32 = 0;

/// 电源状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum PowerState {
    Off = 0,
    On = 1,
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { PowerState::On } else { PowerState::Off }
    }
}

/// 夹爪动作
///
/// 夹爪没有"运动中"反馈，发出命令后只能等待固定的稳定时间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(i32)]
pub enum GripperAction {
    /// 闭合（夹住样品环）
    Close = 0,
    /// 张开（释放样品环）
    Open = 1,
}

impl GripperAction {
    /// 从 IOC 读回的值解析
    pub fn from_value(value: i32) -> Result<Self, PvError> {
        Self::try_from(value).map_err(|_| PvError::UnknownValue {
            pv: PvName::Gripper,
            value,
        })
    }

    pub fn is_open(self) -> bool {
        self == GripperAction::Open
    }
}

impl From<bool> for GripperAction {
    /// `true` 表示张开
    fn from(open: bool) -> Self {
        if open {
            GripperAction::Open
        } else {
            GripperAction::Close
        }
    }
}

impl fmt::Display for GripperAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GripperAction::Close => f.write_str("close"),
            GripperAction::Open => f.write_str("open"),
        }
    }
}

/// 杜瓦样品位索引
///
/// 正整数；上限由 IOC 负责校验。0 被保留给 [`BEAM_POSITION`]，
/// 因此不能作为样品位使用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct LoopIndex(NonZeroU32);

impl LoopIndex {
    /// 创建样品位索引
    ///
    /// # 错误
    ///
    /// - `PvError::InvalidLoopIndex`: `index == 0`
    pub fn new(index: u32) -> Result<Self, PvError> {
        NonZeroU32::new(index)
            .map(LoopIndex)
            .ok_or(PvError::InvalidLoopIndex(0))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for LoopIndex {
    type Error = PvError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        LoopIndex::new(value)
    }
}

impl TryFrom<i64> for LoopIndex {
    type Error = PvError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(LoopIndex)
            .ok_or(PvError::InvalidLoopIndex(value))
    }
}

impl From<LoopIndex> for u32 {
    fn from(index: LoopIndex) -> Self {
        index.get()
    }
}

impl fmt::Display for LoopIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 解码 0/1 标志位
///
/// Channel Access 读回的是双精度值，这里只接受精确的 0 和 1，
/// 其他值（包括 NaN）视为 IOC 异常，交由上层中止当前循环。
pub fn decode_flag(pv: PvName, value: f64) -> Result<bool, PvError> {
    if value == 0.0 {
        Ok(false)
    } else if value == 1.0 {
        Ok(true)
    } else {
        Err(PvError::InvalidFlag { pv, value })
    }
}
