//! 循环与运动状态类型

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 循环步骤（按执行顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStep {
    /// 从杜瓦取样品环
    Pick,
    /// 闭合夹爪
    CloseGripper,
    /// 放置到目标位置
    Place,
    /// 送回杜瓦
    Retrieve,
    /// 张开夹爪
    OpenGripper,
}

impl CycleStep {
    /// 一次循环的全部步骤
    pub const ALL: [CycleStep; 5] = [
        CycleStep::Pick,
        CycleStep::CloseGripper,
        CycleStep::Place,
        CycleStep::Retrieve,
        CycleStep::OpenGripper,
    ];

    /// 是否为需要等待运动完成的步骤
    pub const fn is_motion(self) -> bool {
        matches!(
            self,
            CycleStep::Pick | CycleStep::Place | CycleStep::Retrieve
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CycleStep::Pick => "pick",
            CycleStep::CloseGripper => "close_gripper",
            CycleStep::Place => "place",
            CycleStep::Retrieve => "retrieve",
            CycleStep::OpenGripper => "open_gripper",
        }
    }
}

impl fmt::Display for CycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 运动观测结果
///
/// 只由 `isMoving` 的读数推导，不持久化：
///
/// ```text
/// NotStarted --true--> Moving --false--> Complete
///     ^  |false          ^  |true
///     +--+               +--+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionOutcome {
    #[default]
    NotStarted,
    Moving,
    Complete,
}

impl MotionOutcome {
    /// 根据一次新的 `isMoving` 读数推进
    ///
    /// `Complete` 是终态。
    #[must_use]
    pub const fn advance(self, moving: bool) -> Self {
        match (self, moving) {
            (MotionOutcome::NotStarted, false) => MotionOutcome::NotStarted,
            (MotionOutcome::NotStarted, true) => MotionOutcome::Moving,
            (MotionOutcome::Moving, true) => MotionOutcome::Moving,
            (MotionOutcome::Moving, false) => MotionOutcome::Complete,
            (MotionOutcome::Complete, _) => MotionOutcome::Complete,
        }
    }
}

/// 监视器观测到的状态转换
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorTransition {
    /// `isMoving` 首次读到 1
    MotionStarted { polls: u32 },
    /// `stopRequested` 读到 1，开始挂起
    Paused,
    /// 停止请求解除
    Resumed { paused: Duration },
    /// `isMoving` 由 1 变回 0
    MotionComplete { polls: u32 },
}

/// 暂停门状态（由 `stopRequested` 推导）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PauseState {
    #[default]
    Running,
    Paused,
}

impl From<bool> for PauseState {
    fn from(stop_requested: bool) -> Self {
        if stop_requested {
            PauseState::Paused
        } else {
            PauseState::Running
        }
    }
}
