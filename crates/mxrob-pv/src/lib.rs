//! # MXROB PV
//!
//! 样品杜瓦机械臂（Stäubli）过程变量（PV）定义（无传输依赖）
//!
//! ## 模块
//!
//! - `names`: PV 记录名称表及前缀拼接
//! - `values`: 取值编码（电源、夹爪、标志位）
//! - `command`: 机械臂命令到 PV 写入的映射
//! - `error`: 协议层错误
//!
//! ## 命名约定
//!
//! 完整 PV 名称为 `<prefix>:<Record>.VAL`，默认前缀 `MXROB:Staubli2`：
//!
//! ```rust
//! use mxrob_pv::{PvName, PvTable};
//!
//! let table = PvTable::default();
//! assert_eq!(table.full_name(PvName::PickLoop), "MXROB:Staubli2:PickLoop.VAL");
//! ```

pub mod command;
pub mod error;
pub mod names;
pub mod values;

// 重新导出常用类型
pub use command::{ArmCommand, MotionKind, OperatorCommand, PvWrite};
pub use error::PvError;
pub use names::{DEFAULT_PREFIX, PvName, PvTable};
pub use values::{BEAM_POSITION, GripperAction, LoopIndex, PowerState, decode_flag};
