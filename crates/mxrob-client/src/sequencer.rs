//! 循环序列器
//!
//! 对一个样品位执行固定的五步循环：
//!
//! | 步骤            | 命令                      | 之后                  |
//! |-----------------|---------------------------|-----------------------|
//! | `Pick`          | `command_pick(i)`         | 等待运动完成          |
//! | `CloseGripper`  | `set_gripper(Close)`      | `close_settle_ms`     |
//! | `Place`         | `command_place(dest)`     | 等待运动完成          |
//! | `Retrieve`      | `command_retrieve(i)`     | 等待运动完成          |
//! | `OpenGripper`   | `set_gripper(Open)`       | `open_settle_ms`      |
//!
//! 每个命令下发前经过暂停门（`stopRequested` 为 1 时挂起），并检查取消
//! 令牌。监视器的状态转换以事件形式转发给钩子，步骤内的日志都在
//! `step` span 中（带 `loop_index` 和步骤名）。任何一步失败立即终止循环，剩余步骤不再执行，电源状态不变。

use crate::cancel::CancelToken;
use crate::config::CycleConfig;
use crate::error::CycleError;
use crate::hooks::{CycleEvent, CycleEventKind, CycleObserver, HookManager};
use crate::monitor::{MotionMonitor, MotionReport};
use crate::types::{CycleStep, MonitorTransition};
use mxrob_driver::{DriverError, RemoteArm};
use mxrob_pv::{GripperAction, LoopIndex};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn};

/// 单步执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub step: CycleStep,
    /// 下发前在暂停门挂起的时长
    pub gated: Duration,
    /// 运动步骤的等待统计
    pub motion: Option<MotionReport>,
    pub elapsed: Duration,
}

/// 单次循环结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub loop_index: LoopIndex,
    pub steps: Vec<StepReport>,
    pub elapsed: Duration,
}

impl CycleReport {
    /// 所有运动等待中的挂起次数
    pub fn pauses(&self) -> u32 {
        self.steps
            .iter()
            .filter_map(|s| s.motion)
            .map(|m| m.pauses)
            .sum::<u32>()
            + self.steps.iter().filter(|s| !s.gated.is_zero()).count() as u32
    }
}

/// 循环序列器
///
/// # 示例
///
/// ```no_run
/// use mxrob_client::{CancelToken, CycleConfig, CycleSequencer};
/// use mxrob_driver::ArmBuilder;
/// use mxrob_pv::LoopIndex;
/// use std::sync::Arc;
///
/// let arm = Arc::new(ArmBuilder::new().build().unwrap());
/// let sequencer = CycleSequencer::new(arm, CycleConfig::default(), CancelToken::new());
/// let report = sequencer.run_cycle(LoopIndex::new(1).unwrap()).unwrap();
/// println!("cycle took {:?}", report.elapsed);
/// ```
pub struct CycleSequencer<A: RemoteArm + ?Sized> {
    pub(crate) arm: Arc<A>,
    monitor: MotionMonitor<A>,
    pub(crate) config: CycleConfig,
    cancel: CancelToken,
    hooks: HookManager,
}

impl<A: RemoteArm + ?Sized> CycleSequencer<A> {
    pub fn new(arm: Arc<A>, config: CycleConfig, cancel: CancelToken) -> Self {
        let monitor = MotionMonitor::new(arm.clone(), &config.monitor, cancel.clone());
        Self {
            arm,
            monitor,
            config,
            cancel,
            hooks: HookManager::new(),
        }
    }

    pub fn arm(&self) -> &Arc<A> {
        &self.arm
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    pub fn monitor(&self) -> &MotionMonitor<A> {
        &self.monitor
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// 注册事件回调
    pub fn add_observer(&mut self, observer: Arc<dyn CycleObserver>) {
        self.hooks.add_observer(observer);
    }

    pub fn hooks_mut(&mut self) -> &mut HookManager {
        &mut self.hooks
    }

    /// 对一个样品位执行完整循环
    ///
    /// # 错误
    ///
    /// 第一个失败的步骤：
    /// - `CycleError::CommandDispatch`: 命令被拒绝或未回执
    /// - `CycleError::MotionTimeout`: 运动超时
    /// - `CycleError::StatusRead`: 状态读取失败
    /// - `CycleError::OperatorAbort`: 取消令牌被触发
    pub fn run_cycle(&self, loop_index: LoopIndex) -> Result<CycleReport, CycleError> {
        let start = Instant::now();
        info!(loop_index = loop_index.get(), "Cycle started");
        self.emit(loop_index, None, CycleEventKind::CycleStarted);

        let mut steps = Vec::with_capacity(CycleStep::ALL.len());
        for step in CycleStep::ALL {
            match self.run_step(loop_index, step) {
                Ok(report) => steps.push(report),
                Err(err) => {
                    if err.is_abort() {
                        warn!(loop_index = loop_index.get(), %step, "Cycle aborted");
                    } else {
                        error!(loop_index = loop_index.get(), %step, error = %err, "Cycle failed");
                    }
                    self.emit(
                        loop_index,
                        Some(step),
                        CycleEventKind::CycleFailed {
                            reason: err.to_string(),
                        },
                    );
                    return Err(err);
                },
            }
        }

        let elapsed = start.elapsed();
        info!(
            loop_index = loop_index.get(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Cycle completed"
        );
        self.emit(
            loop_index,
            None,
            CycleEventKind::CycleCompleted {
                elapsed_ms: elapsed.as_millis() as u64,
            },
        );

        Ok(CycleReport {
            loop_index,
            steps,
            elapsed,
        })
    }

    fn run_step(&self, loop_index: LoopIndex, step: CycleStep) -> Result<StepReport, CycleError> {
        let span = info_span!("step", loop_index = loop_index.get(), %step);
        let _enter = span.enter();

        let start = Instant::now();
        let abort = || CycleError::OperatorAbort { step, loop_index };
        let observe = move |transition: MonitorTransition| {
            self.emit(loop_index, Some(step), CycleEventKind::from(transition));
        };

        self.cancel.check().map_err(|_| abort())?;
        let gated = self
            .monitor
            .pass_gate_with(observe)
            .map_err(|e| CycleError::from_monitor(step, loop_index, e))?;

        info!(loop_index = loop_index.get(), %step, "Dispatching");
        self.emit(loop_index, Some(step), CycleEventKind::StepStarted);
        self.dispatch(step, loop_index)
            .map_err(|source| CycleError::CommandDispatch {
                step,
                loop_index,
                source,
            })?;

        let motion = if step.is_motion() {
            let report = self
                .monitor
                .wait_for_motion_complete_with(observe)
                .map_err(|e| CycleError::from_monitor(step, loop_index, e))?;
            Some(report)
        } else {
            self.cancel
                .sleep(self.settle_delay(step), self.monitor.poll_interval())
                .map_err(|_| abort())?;
            None
        };

        let report = StepReport {
            step,
            gated,
            motion,
            elapsed: start.elapsed(),
        };
        let summary = report.motion.unwrap_or_default();
        self.emit(
            loop_index,
            Some(step),
            CycleEventKind::StepCompleted {
                polls: summary.polls,
                pauses: summary.pauses,
                paused_ms: (summary.paused + gated).as_millis() as u64,
                elapsed_ms: report.elapsed.as_millis() as u64,
            },
        );
        Ok(report)
    }

    fn dispatch(&self, step: CycleStep, loop_index: LoopIndex) -> Result<(), DriverError> {
        match step {
            CycleStep::Pick => self.arm.command_pick(loop_index),
            CycleStep::CloseGripper => self.arm.set_gripper(GripperAction::Close),
            CycleStep::Place => self.arm.command_place(self.config.sequencer.place_destination),
            CycleStep::Retrieve => self.arm.command_retrieve(loop_index),
            CycleStep::OpenGripper => self.arm.set_gripper(GripperAction::Open),
        }
    }

    fn settle_delay(&self, step: CycleStep) -> Duration {
        match step {
            CycleStep::CloseGripper => self.config.sequencer.close_settle(),
            CycleStep::OpenGripper => self.config.sequencer.open_settle(),
            _ => Duration::ZERO,
        }
    }

    fn emit(&self, loop_index: LoopIndex, step: Option<CycleStep>, kind: CycleEventKind) {
        if !self.hooks.is_empty() {
            self.hooks
                .trigger_all(&CycleEvent::now(loop_index, step, kind));
        }
    }
}
