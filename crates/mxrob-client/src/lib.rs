//! # MXROB Client
//!
//! 取样/放样/回收循环的编排层。
//!
//! ## 核心组件
//!
//! - [`MotionMonitor`]: 轮询 `isMoving`/`stopRequested`，把命令回执变成
//!   "运动已完成"的同步屏障，并在操作员请求停止时挂起
//! - [`CycleSequencer`]: 对一个样品位执行 pick → close → place → retrieve → open，
//!   每个运动命令之后经过监视器屏障
//! - 批量运行（[`CycleSequencer::run_batch`]）：上电 → 逐个循环 → 断电
//!
//! ## 辅助
//!
//! - [`CancelToken`]: 跨线程取消（Ctrl-C）
//! - [`CycleConfig`]: TOML 配置
//! - [`hooks`]/[`recording`]: 事件回调与异步录制
//!
//! # 示例
//!
//! ```no_run
//! use mxrob_client::{CancelToken, CycleConfig, CycleSequencer};
//! use mxrob_driver::{ArmBuilder, Backend};
//! use mxrob_transport::SimConfig;
//! use std::sync::Arc;
//!
//! let arm = ArmBuilder::new()
//!     .backend(Backend::Simulated(SimConfig::default()))
//!     .build()
//!     .unwrap();
//! let sequencer = CycleSequencer::new(Arc::new(arm), CycleConfig::default(), CancelToken::new());
//! let report = sequencer.run_configured_batch().unwrap();
//! assert!(report.is_success());
//! ```

mod batch;
mod cancel;
pub mod config;
mod error;
pub mod hooks;
pub mod monitor;
pub mod recording;
pub mod sequencer;
pub mod types;

#[cfg(test)]
mod test_support;

pub use batch::BatchReport;
pub use cancel::{CancelToken, Cancelled};
pub use config::{BatchConfig, CycleConfig, MonitorConfig, SequencerConfig};
pub use error::{BatchError, ConfigError, CycleError, MonitorError};
pub use hooks::{CycleEvent, CycleEventKind, CycleObserver, HookManager, TracingObserver};
pub use monitor::{MotionMonitor, MotionReport};
pub use recording::EventRecorder;
pub use sequencer::{CycleReport, CycleSequencer, StepReport};
pub use types::{CycleStep, MonitorTransition, MotionOutcome, PauseState};
