//! MXROB SDK - 样品杜瓦机械臂 Rust SDK
//!
//! 通过 EPICS PV 驱动 Stäubli 机械臂完成取样 → 放样 → 回收循环，
//! 支持操作员在运动中途停止/恢复。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **PV 层** (`pv`): 记录名称表、取值编码、命令映射
//! - **传输层** (`transport`): `caput`/`caget`、模拟 IOC、Mock
//! - **驱动层** (`driver`): `RemoteArm` 接口与 PV 实现
//! - **客户端层** (`client`): 运动监视器、循环序列器、批量运行
//!
//! # 快速开始
//!
//! ```no_run
//! use mxrob_sdk::prelude::*;
//! use std::sync::Arc;
//!
//! mxrob_sdk::init_logging("info").ok();
//!
//! let arm = ArmBuilder::new().prefix("MXROB:Staubli2").build().unwrap();
//! let sequencer = CycleSequencer::new(Arc::new(arm), CycleConfig::default(), CancelToken::new());
//! let report = sequencer.run_cycle(LoopIndex::new(1).unwrap()).unwrap();
//! println!("{} steps in {:?}", report.steps.len(), report.elapsed);
//! ```

pub use mxrob_client as client;
pub use mxrob_driver as driver;
pub use mxrob_pv as pv;
pub use mxrob_transport as transport;

pub mod prelude;

// PV 层常用类型
pub use pv::{GripperAction, LoopIndex, PvName, PvTable};

// 驱动层
pub use driver::{ArmBuilder, Backend, DriverError, PvArm, RemoteArm};

// 客户端层（推荐入口）
pub use client::{
    BatchReport, CancelToken, CycleConfig, CycleError, CycleReport, CycleSequencer, CycleStep,
    MotionMonitor,
};

use tracing_subscriber::EnvFilter;

/// 日志初始化失败（通常是全局 subscriber 已被设置）
pub type LoggingError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 初始化 `tracing` 日志输出到 stderr
///
/// `RUST_LOG` 存在时优先使用，否则使用 `default_directive`（如 `"info"`、
/// `"mxrob_client=debug"`）。
///
/// # 错误
///
/// 全局 subscriber 已经设置过，或 `default_directive` 无法解析。
pub fn init_logging(default_directive: &str) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_init_logging_once() {
        // 同一进程只能设置一次全局 subscriber
        let _ = init_logging("info");
        assert!(init_logging("debug").is_err());
    }

    #[test]
    fn test_facade_reexports() {
        let table = PvTable::default();
        assert_eq!(table.full_name(PvName::Gripper), "MXROB:Staubli2:Gripper.VAL");
        assert_eq!(CycleStep::ALL.len(), 5);
    }
}
