//! 命令到 PV 写入的映射
//!
//! 所有写入都是"单个记录 + 整数值"，传输层据此执行带回执的 put。

use crate::error::PvError;
use crate::names::PvName;
use crate::values::{GripperAction, LoopIndex, PowerState};
use std::fmt;

/// 一次 PV 写入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PvWrite {
    pub pv: PvName,
    pub value: i32,
}

impl PvWrite {
    pub const fn new(pv: PvName, value: i32) -> Self {
        Self { pv, value }
    }
}

impl fmt::Display for PvWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.pv, self.value)
    }
}

/// 运动类别
///
/// 每类运动对应一个命令记录，完成与否统一通过 `CheckMoving` 观察。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MotionKind {
    /// 杜瓦 → 杜瓦参考位
    Pick,
    /// 杜瓦参考位 → 光束位
    Place,
    /// 光束位 → 杜瓦
    Retrieve,
}

impl MotionKind {
    /// 对应的命令记录
    pub const fn pv(self) -> PvName {
        match self {
            MotionKind::Pick => PvName::PickLoop,
            MotionKind::Place => PvName::PlaceLoop,
            MotionKind::Retrieve => PvName::RetrieveLoop,
        }
    }

    /// 从命令记录反查
    pub const fn from_pv(pv: PvName) -> Option<Self> {
        match pv {
            PvName::PickLoop => Some(MotionKind::Pick),
            PvName::PlaceLoop => Some(MotionKind::Place),
            PvName::RetrieveLoop => Some(MotionKind::Retrieve),
            _ => None,
        }
    }
}

impl fmt::Display for MotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionKind::Pick => f.write_str("pick"),
            MotionKind::Place => f.write_str("place"),
            MotionKind::Retrieve => f.write_str("retrieve"),
        }
    }
}

/// 操作员侧运动控制
///
/// 序列器从不主动发送这些命令，只对 `StopMove` 的状态做出反应。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// 中断并保存当前运动（`StopMove <- 1`）
    Stop,
    /// 解除停止请求（`StopMove <- 0`）
    Resume,
    /// 清空运动栈（`DeleteMove <- 1`）
    Delete,
    /// 重新执行运动栈（`RestartMove <- 1`）
    Restart,
}

/// 机械臂命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmCommand {
    /// 上电/断电
    Power(PowerState),
    /// 取样品环
    Pick(LoopIndex),
    /// 放置到目标位置（0 = 光束位）
    Place(u32),
    /// 送回样品环
    Retrieve(LoopIndex),
    /// 夹爪开合
    Gripper(GripperAction),
    /// 操作员控制
    Operator(OperatorCommand),
}

impl ArmCommand {
    /// 映射为 PV 写入
    ///
    /// # 错误
    ///
    /// - `PvError::ValueOutOfRange`: 索引超出 `i32` 范围（IOC 记录为 LONG）
    pub fn to_write(self) -> Result<PvWrite, PvError> {
        let write = match self {
            ArmCommand::Power(state) => PvWrite::new(PvName::Power, state.into()),
            ArmCommand::Pick(index) => index_write(PvName::PickLoop, index.get())?,
            ArmCommand::Place(dest) => index_write(PvName::PlaceLoop, dest)?,
            ArmCommand::Retrieve(index) => index_write(PvName::RetrieveLoop, index.get())?,
            ArmCommand::Gripper(action) => PvWrite::new(PvName::Gripper, action.into()),
            ArmCommand::Operator(OperatorCommand::Stop) => PvWrite::new(PvName::StopMove, 1),
            ArmCommand::Operator(OperatorCommand::Resume) => PvWrite::new(PvName::StopMove, 0),
            ArmCommand::Operator(OperatorCommand::Delete) => PvWrite::new(PvName::DeleteMove, 1),
            ArmCommand::Operator(OperatorCommand::Restart) => {
                PvWrite::new(PvName::RestartMove, 1)
            },
        };
        Ok(write)
    }

    /// 运动类命令的类别
    pub fn motion_kind(self) -> Option<MotionKind> {
        match self {
            ArmCommand::Pick(_) => Some(MotionKind::Pick),
            ArmCommand::Place(_) => Some(MotionKind::Place),
            ArmCommand::Retrieve(_) => Some(MotionKind::Retrieve),
            _ => None,
        }
    }

    pub fn is_motion(self) -> bool {
        self.motion_kind().is_some()
    }
}

fn index_write(pv: PvName, index: u32) -> Result<PvWrite, PvError> {
    i32::try_from(index)
        .map(|value| PvWrite::new(pv, value))
        .map_err(|_| PvError::ValueOutOfRange {
            pv,
            value: u64::from(index),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(n: u32) -> LoopIndex {
        LoopIndex::new(n).unwrap()
    }

    #[test]
    fn test_motion_commands_map_to_records() {
        assert_eq!(
            ArmCommand::Pick(idx(3)).to_write(),
            Ok(PvWrite::new(PvName::PickLoop, 3))
        );
        assert_eq!(
            ArmCommand::Place(0).to_write(),
            Ok(PvWrite::new(PvName::PlaceLoop, 0))
        );
        assert_eq!(
            ArmCommand::Retrieve(idx(3)).to_write(),
            Ok(PvWrite::new(PvName::RetrieveLoop, 3))
        );
    }

    #[test]
    fn test_gripper_and_power() {
        assert_eq!(
            ArmCommand::Gripper(GripperAction::Close).to_write(),
            Ok(PvWrite::new(PvName::Gripper, 0))
        );
        assert_eq!(
            ArmCommand::Gripper(GripperAction::Open).to_write(),
            Ok(PvWrite::new(PvName::Gripper, 1))
        );
        assert_eq!(
            ArmCommand::Power(PowerState::On).to_write(),
            Ok(PvWrite::new(PvName::Power, 1))
        );
    }

    #[test]
    fn test_operator_commands() {
        let stop = ArmCommand::Operator(OperatorCommand::Stop).to_write().unwrap();
        let resume = ArmCommand::Operator(OperatorCommand::Resume).to_write().unwrap();
        assert_eq!(stop, PvWrite::new(PvName::StopMove, 1));
        assert_eq!(resume, PvWrite::new(PvName::StopMove, 0));
        assert_eq!(
            ArmCommand::Operator(OperatorCommand::Delete).to_write(),
            Ok(PvWrite::new(PvName::DeleteMove, 1))
        );
        assert_eq!(
            ArmCommand::Operator(OperatorCommand::Restart).to_write(),
            Ok(PvWrite::new(PvName::RestartMove, 1))
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let err = ArmCommand::Place(u32::MAX).to_write().unwrap_err();
        assert!(matches!(
            err,
            PvError::ValueOutOfRange { pv: PvName::PlaceLoop, .. }
        ));
    }

    #[test]
    fn test_motion_kind() {
        assert_eq!(ArmCommand::Pick(idx(1)).motion_kind(), Some(MotionKind::Pick));
        assert!(!ArmCommand::Gripper(GripperAction::Open).is_motion());
        assert_eq!(MotionKind::from_pv(PvName::RetrieveLoop), Some(MotionKind::Retrieve));
        assert_eq!(MotionKind::Place.pv(), PvName::PlaceLoop);
    }
}
