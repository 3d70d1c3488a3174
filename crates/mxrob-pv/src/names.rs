//! PV 记录名称表
//!
//! 机械臂 IOC 暴露的全部记录。序列器只驱动其中一部分（电源、取/放/回收、
//! 夹爪、运动状态、停止控制），其余（笛卡尔点动、工具设置）仅在表中登记，
//! 方便调试工具按名访问。

use crate::error::PvError;
use std::fmt;
use std::str::FromStr;

/// 默认 PV 前缀
pub const DEFAULT_PREFIX: &str = "MXROB:Staubli2";

/// 记录字段后缀
const FIELD_SUFFIX: &str = ".VAL";

/// 机械臂 IOC 记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PvName {
    /// 机械臂电源（1 = 上电，0 = 断电）
    Power,
    /// 读取工具 X 坐标（依赖当前坐标系）
    GetX,
    /// 读取工具 Y 坐标
    GetY,
    /// 读取工具 Z 坐标
    GetZ,
    /// 沿 X 方向移动（需已知坐标系）
    MoveX,
    /// 沿 Y 方向移动
    MoveY,
    /// 沿 Z 方向移动
    MoveZ,
    /// 从杜瓦取样品环，并停在杜瓦参考位
    PickLoop,
    /// 将样品环从光束位送回杜瓦
    RetrieveLoop,
    /// 将样品环从杜瓦参考位送到光束位
    PlaceLoop,
    /// 中断并保存当前运动（1 = 请求停止）
    StopMove,
    /// 清空运动栈
    DeleteMove,
    /// 恢复运动栈中的运动
    RestartMove,
    /// 运动状态反馈（1 = 运动中，0 = 静止）
    CheckMoving,
    /// 在控制器中直接设置工具（仅开发期使用）
    SetTool,
    /// 更换工具
    PickTool,
    /// 夹爪开合（0 = 闭合，1 = 张开）
    Gripper,
}

impl PvName {
    /// 全部记录（按 IOC 定义顺序）
    pub const ALL: [PvName; 17] = [
        PvName::Power,
        PvName::GetX,
        PvName::GetY,
        PvName::GetZ,
        PvName::MoveX,
        PvName::MoveY,
        PvName::MoveZ,
        PvName::PickLoop,
        PvName::RetrieveLoop,
        PvName::PlaceLoop,
        PvName::StopMove,
        PvName::DeleteMove,
        PvName::RestartMove,
        PvName::CheckMoving,
        PvName::SetTool,
        PvName::PickTool,
        PvName::Gripper,
    ];

    /// 记录名（不含前缀和字段）
    pub const fn record(self) -> &'static str {
        match self {
            PvName::Power => "Power",
            PvName::GetX => "GetX",
            PvName::GetY => "GetY",
            PvName::GetZ => "GetZ",
            PvName::MoveX => "MoveX",
            PvName::MoveY => "MoveY",
            PvName::MoveZ => "MoveZ",
            PvName::PickLoop => "PickLoop",
            PvName::RetrieveLoop => "RetrieveLoop",
            PvName::PlaceLoop => "PlaceLoop",
            PvName::StopMove => "StopMove",
            PvName::DeleteMove => "DeleteMove",
            PvName::RestartMove => "RestartMove",
            PvName::CheckMoving => "CheckMoving",
            PvName::SetTool => "SetTool",
            PvName::PickTool => "PickTool",
            PvName::Gripper => "Gripper",
        }
    }

    /// 是否为 0/1 标志位记录
    pub const fn is_flag(self) -> bool {
        matches!(
            self,
            PvName::Power | PvName::CheckMoving | PvName::StopMove | PvName::Gripper
        )
    }

    /// 在 `ALL` 中的下标
    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record())
    }
}

impl FromStr for PvName {
    type Err = PvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PvName::ALL
            .iter()
            .copied()
            .find(|pv| pv.record() == s)
            .ok_or_else(|| PvError::UnknownRecord(s.to_string()))
    }
}

/// 带前缀的 PV 名称表
///
/// 构造时一次性拼接全部完整名称，之后 `full_name()` 只返回借用，
/// 轮询路径上不产生分配。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PvTable {
    prefix: String,
    names: Vec<String>,
}

impl PvTable {
    /// 使用指定前缀创建名称表
    ///
    /// 前缀末尾的 `:` 会被去掉，`"MXROB:Staubli2:"` 与 `"MXROB:Staubli2"` 等价。
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_end_matches(':').to_string();
        let names = PvName::ALL
            .iter()
            .map(|pv| format!("{}:{}{}", prefix, pv.record(), FIELD_SUFFIX))
            .collect();
        Self { prefix, names }
    }

    /// 前缀
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 完整 PV 名称，如 `MXROB:Staubli2:CheckMoving.VAL`
    pub fn full_name(&self, pv: PvName) -> &str {
        &self.names[pv.index()]
    }

    /// 从完整名称反查记录
    ///
    /// 同时接受带和不带 `.VAL` 字段的写法。
    pub fn lookup(&self, full_name: &str) -> Option<PvName> {
        let rest = full_name.strip_prefix(self.prefix.as_str())?.strip_prefix(':')?;
        let record = rest.strip_suffix(FIELD_SUFFIX).unwrap_or(rest);
        record.parse().ok()
    }

    /// 遍历全部 (记录, 完整名称)
    pub fn iter(&self) -> impl Iterator<Item = (PvName, &str)> {
        PvName::ALL
            .iter()
            .copied()
            .zip(self.names.iter().map(String::as_str))
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
