//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use mxrob_sdk::prelude::*;
//! ```

// 客户端层
pub use crate::client::{
    CancelToken, CycleConfig, CycleError, CycleEvent, CycleObserver, CycleReport, CycleSequencer,
    CycleStep, EventRecorder, MotionMonitor, MotionReport,
};

// 驱动层
pub use crate::driver::{ArmBuilder, Backend, DriverError, PvArm, RemoteArm};

// PV 层
pub use crate::pv::{GripperAction, LoopIndex, PvName, PvTable};

// 传输层
pub use crate::transport::{PvTransport, SimConfig, SimulatedIoc};
