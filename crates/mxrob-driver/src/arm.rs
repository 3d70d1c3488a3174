//! 机械臂远程接口
//!
//! [`RemoteArm`] 是序列器看到的全部外部世界：命令写入 + 两个状态标志。
//! 具体传输（Channel Access、模拟 IOC、Mock）由实现方决定。

use crate::error::DriverError;
use mxrob_pv::{GripperAction, LoopIndex};

/// 驱动层 Result
pub type Result<T> = std::result::Result<T, DriverError>;

/// 机械臂远程接口
///
/// # 语义
///
/// - 所有写入方法阻塞到 IOC 回执为止；回执只代表命令被受理，运动可能仍在进行
/// - `is_moving()`/`stop_requested()` 每次都是新的读取，实现不得缓存
/// - 操作员侧方法（`stop_move` 等）供工具和测试使用，序列器本身从不调用
///
/// 实现必须是 `Send + Sync`：操作员线程可能在序列器阻塞时并发调用。
pub trait RemoteArm: Send + Sync {
    /// 上电/断电
    fn set_power(&self, on: bool) -> Result<()>;

    /// 从杜瓦取出 `loop_index` 号样品环
    fn command_pick(&self, loop_index: LoopIndex) -> Result<()>;

    /// 放置到目标位置（0 = 光束位）
    fn command_place(&self, dest_index: u32) -> Result<()>;

    /// 将样品环送回 `loop_index` 号位
    fn command_retrieve(&self, loop_index: LoopIndex) -> Result<()>;

    /// 夹爪开合（无完成反馈）
    fn set_gripper(&self, action: GripperAction) -> Result<()>;

    /// 机械臂是否在运动
    fn is_moving(&self) -> Result<bool>;

    /// 操作员是否请求停止
    fn stop_requested(&self) -> Result<bool>;

    /// 中断并保存当前运动
    fn stop_move(&self) -> Result<()>;

    /// 解除停止请求
    fn resume_move(&self) -> Result<()>;

    /// 清空运动栈
    fn delete_move(&self) -> Result<()>;

    /// 重新执行运动栈
    fn restart_move(&self) -> Result<()>;

    /// 读取状态快照
    ///
    /// 两次独立读取，不保证原子性。
    fn status(&self) -> Result<ArmStatus> {
        Ok(ArmStatus {
            moving: self.is_moving()?,
            stop_requested: self.stop_requested()?,
        })
    }
}

/// 状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArmStatus {
    pub moving: bool,
    pub stop_requested: bool,
}
