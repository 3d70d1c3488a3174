//! 驱动层模块
//!
//! 本模块把 PV 读写封装为机械臂语义接口，包括：
//! - [`RemoteArm`]：序列器依赖的远程接口（命令写入 + 状态读取）
//! - [`PvArm`]：基于任意 [`PvTransport`](mxrob_transport::PvTransport) 的实现
//! - [`ArmBuilder`]：按前缀和后端（CA 命令行工具 / 模拟 IOC）构造实例
//!
//! # 使用场景
//!
//! 适用于需要单独发送命令或读取状态的工具。完整的取/放/回收循环请使用
//! `mxrob-client` 提供的序列器。

pub mod arm;
mod builder;
mod error;
mod pv_arm;

pub use arm::{ArmStatus, RemoteArm};
pub use builder::{ArmBuilder, Backend, DynArm};
pub use error::DriverError;
pub use pv_arm::PvArm;
