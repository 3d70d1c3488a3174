//! 运动监视器
//!
//! 把"命令已回执"变成"运动已完成"：先等到 `isMoving` 读到 1（运动确实
//! 开始），再等到它读回 0。两个阶段中每次读到 0/1 之后都检查一次
//! `stopRequested`，操作员请求停止时原地挂起，直到请求解除。
//!
//! ```text
//! NotStarted --isMoving=1--> Moving --isMoving=0--> Complete
//!      |                        |
//!      +--stopRequested=1--> (wait_for_resume) --+
//! ```
//!
//! # 阻塞行为
//!
//! 所有等待都是**阻塞的 (Blocking)**：固定间隔轮询，每次迭代检查取消令牌。
//! 超时只计算运动时间，挂起时间不计入。

use crate::cancel::CancelToken;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::types::{MonitorTransition, MotionOutcome, PauseState};
use mxrob_driver::RemoteArm;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// 一次运动等待的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionReport {
    /// `isMoving` 读取次数
    pub polls: u32,
    /// 挂起次数
    pub pauses: u32,
    /// 挂起总时长
    pub paused: Duration,
    /// 总耗时（含挂起）
    pub elapsed: Duration,
}

impl MotionReport {
    /// 扣除挂起后的运动时间
    pub fn active(&self) -> Duration {
        self.elapsed.saturating_sub(self.paused)
    }
}

/// 运动监视器
pub struct MotionMonitor<A: RemoteArm + ?Sized> {
    arm: Arc<A>,
    poll_interval: Duration,
    timeout: Option<Duration>,
    cancel: CancelToken,
}

impl<A: RemoteArm + ?Sized> MotionMonitor<A> {
    pub fn new(arm: Arc<A>, config: &MonitorConfig, cancel: CancelToken) -> Self {
        Self {
            arm,
            poll_interval: config.poll_interval(),
            timeout: config.motion_timeout(),
            cancel,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// 等待已下发的运动完成
    ///
    /// 只有在观测到 `isMoving` 由 1 变 0 之后才返回；从未读到 1 的等待
    /// 不会提前结束。确认运动开始后立即重新读取一次，不等待轮询间隔。
    ///
    /// # 错误
    ///
    /// - `MonitorError::Timeout`: 运动时间（不含挂起）超过配置上限
    /// - `MonitorError::Aborted`: 取消令牌被触发
    /// - `MonitorError::Status`: 状态读取失败或读回非 0/1 值
    pub fn wait_for_motion_complete(&self) -> Result<MotionReport, MonitorError> {
        self.wait_for_motion_complete_with(|_| {})
    }

    /// 同 [`wait_for_motion_complete`](Self::wait_for_motion_complete)，
    /// 每次状态转换（开始、挂起、恢复、完成）时回调 `observe`
    pub fn wait_for_motion_complete_with(
        &self,
        mut observe: impl FnMut(MonitorTransition),
    ) -> Result<MotionReport, MonitorError> {
        let start = Instant::now();
        let mut report = MotionReport::default();
        let mut outcome = MotionOutcome::NotStarted;

        loop {
            self.cancel.check()?;
            let moving = self.arm.is_moving()?;
            report.polls += 1;

            let next = outcome.advance(moving);
            trace!(polls = report.polls, moving, ?next, "isMoving poll");
            match (outcome, next) {
                (_, MotionOutcome::Complete) => {
                    report.elapsed = start.elapsed();
                    debug!(
                        polls = report.polls,
                        pauses = report.pauses,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "Motion complete"
                    );
                    observe(MonitorTransition::MotionComplete {
                        polls: report.polls,
                    });
                    return Ok(report);
                },
                (MotionOutcome::NotStarted, MotionOutcome::Moving) => {
                    debug!(polls = report.polls, "Motion started");
                    observe(MonitorTransition::MotionStarted {
                        polls: report.polls,
                    });
                    outcome = next;
                    continue;
                },
                _ => outcome = next,
            }

            if self.pause_state()? == PauseState::Paused {
                let paused = self.park(outcome, &mut observe)?;
                report.pauses += 1;
                report.paused += paused;
            }

            let sleep = self.next_sleep(start, report.paused)?;
            thread::sleep(sleep);
        }
    }

    /// 阻塞直到 `stopRequested` 读到 0
    ///
    /// 首次读取即为 0 时立即返回。不下发任何命令，也不改变机械臂状态。
    ///
    /// # 返回
    ///
    /// 挂起的时长。
    ///
    /// # 错误
    ///
    /// - `MonitorError::Aborted`: 取消令牌被触发
    /// - `MonitorError::Status`: 状态读取失败
    pub fn wait_for_resume(&self) -> Result<Duration, MonitorError> {
        let start = Instant::now();
        loop {
            self.cancel.check()?;
            if self.pause_state()? == PauseState::Running {
                return Ok(start.elapsed());
            }
            thread::sleep(self.poll_interval);
        }
    }

    /// 下发命令前的暂停门
    ///
    /// 读一次 `stopRequested`；为 1 时挂起直到解除。
    pub fn pass_gate(&self) -> Result<Duration, MonitorError> {
        self.pass_gate_with(|_| {})
    }

    /// 同 [`pass_gate`](Self::pass_gate)，挂起与恢复时回调 `observe`
    pub fn pass_gate_with(
        &self,
        mut observe: impl FnMut(MonitorTransition),
    ) -> Result<Duration, MonitorError> {
        match self.pause_state()? {
            PauseState::Running => Ok(Duration::ZERO),
            PauseState::Paused => self.park(MotionOutcome::NotStarted, &mut observe),
        }
    }

    fn pause_state(&self) -> Result<PauseState, MonitorError> {
        Ok(PauseState::from(self.arm.stop_requested()?))
    }

    fn park(
        &self,
        outcome: MotionOutcome,
        observe: &mut impl FnMut(MonitorTransition),
    ) -> Result<Duration, MonitorError> {
        warn!(?outcome, "Operator stop requested, waiting for resume");
        observe(MonitorTransition::Paused);
        let paused = self.wait_for_resume()?;
        info!(paused_ms = paused.as_millis() as u64, "Stop request cleared, resuming");
        observe(MonitorTransition::Resumed { paused });
        Ok(paused)
    }

    /// 下一次睡眠时长（超时检查）
    fn next_sleep(&self, start: Instant, paused: Duration) -> Result<Duration, MonitorError> {
        let Some(timeout) = self.timeout else {
            return Ok(self.poll_interval);
        };

        let active = start.elapsed().saturating_sub(paused);
        let remaining = timeout.saturating_sub(active);
        let sleep = self.poll_interval.min(remaining);
        if sleep.is_zero() {
            let timeout_ms = timeout.as_millis() as u64;
            warn!(timeout_ms, "Motion wait timed out");
            return Err(MonitorError::Timeout { timeout_ms });
        }
        Ok(sleep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use mxrob_driver::DriverError;
    use mxrob_pv::PvName;
    use mxrob_transport::{MockOp, MockTransport};

    fn monitor(
        arm: Arc<MockArm>,
        poll_ms: u64,
        timeout_ms: u64,
    ) -> (MotionMonitor<MockArm>, CancelToken) {
        let config = MonitorConfig {
            poll_interval_ms: poll_ms,
            motion_timeout_ms: timeout_ms,
        };
        let cancel = CancelToken::new();
        (MotionMonitor::new(arm, &config, cancel.clone()), cancel)
    }

    fn moving_reads(mock: &MockTransport) -> usize {
        mock.get_count(&pv(PvName::CheckMoving))
    }

    #[test]
    fn test_waits_for_start_then_stop() {
        let (mock, arm) = mock_arm();
        mock.script(&pv(PvName::CheckMoving), [0.0, 0.0, 1.0, 1.0, 0.0]);
        let (monitor, _) = monitor(arm, 1, 1_000);

        let report = monitor.wait_for_motion_complete().unwrap();
        assert_eq!(report.polls, 5);
        assert_eq!(report.pauses, 0);
        assert_eq!(moving_reads(&mock), 5);
    }

    #[test]
    fn test_no_reads_while_parked() {
        let (mock, arm) = mock_arm();
        let moving = pv(PvName::CheckMoving);
        let stop = pv(PvName::StopMove);
        mock.script(&moving, [0.0, 0.0, 1.0, 0.0]);
        // 第 2 次轮询后请求停止，再过 3 次读取解除
        mock.script(&stop, [0.0, 1.0, 1.0, 1.0, 0.0]);
        let (monitor, _) = monitor(arm, 1, 1_000);

        let report = monitor.wait_for_motion_complete().unwrap();
        assert_eq!(report.pauses, 1);
        assert_eq!(report.polls, 4);

        // 停止请求期间不读取 isMoving
        let journal = mock.journal();
        let first_stop = journal
            .iter()
            .position(|op| matches!(op, MockOp::Get { pv, value } if *pv == stop && *value == 1.0))
            .unwrap();
        let cleared = journal
            .iter()
            .rposition(|op| matches!(op, MockOp::Get { pv, value } if *pv == stop && *value == 0.0))
            .unwrap();
        assert!(journal[first_stop..cleared].iter().all(|op| op.pv() != moving));
        assert!(journal.iter().all(|op| !op.is_put()));
    }

    #[test]
    fn test_reports_transitions_in_order() {
        let (mock, arm) = mock_arm();
        mock.script(&pv(PvName::CheckMoving), [0.0, 1.0, 1.0, 0.0]);
        // 确认开始后的下一次 stopRequested 读取为 1
        mock.script(&pv(PvName::StopMove), [0.0, 1.0, 0.0]);
        let (monitor, _) = monitor(arm, 1, 1_000);

        let mut seen = Vec::new();
        let report = monitor
            .wait_for_motion_complete_with(|transition| seen.push(transition))
            .unwrap();

        assert_eq!(report.pauses, 1);
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], MonitorTransition::MotionStarted { polls: 2 });
        assert_eq!(seen[1], MonitorTransition::Paused);
        assert!(matches!(seen[2], MonitorTransition::Resumed { .. }));
        assert_eq!(
            seen[3],
            MonitorTransition::MotionComplete {
                polls: report.polls
            }
        );
    }

    #[test]
    fn test_never_started_times_out() {
        let (mock, arm) = mock_arm();
        let (monitor, _) = monitor(arm, 2, 30);

        let err = monitor.wait_for_motion_complete().unwrap_err();
        assert!(matches!(err, MonitorError::Timeout { timeout_ms: 30 }));
        assert!(moving_reads(&mock) >= 2);
    }

    #[test]
    fn test_still_moving_times_out() {
        let (mock, arm) = mock_arm();
        mock.set(&pv(PvName::CheckMoving), 1.0);
        let (monitor, _) = monitor(arm, 2, 30);

        assert!(matches!(
            monitor.wait_for_motion_complete(),
            Err(MonitorError::Timeout { .. })
        ));
    }

    #[test]
    fn test_timeout_excludes_paused_time() {
        let (mock, arm) = mock_arm();
        let moving = pv(PvName::CheckMoving);
        let stop = pv(PvName::StopMove);
        mock.set(&moving, 1.0);
        mock.set(&stop, 1.0);
        let (monitor, _) = monitor(arm, 2, 50);

        let operator = {
            let mock = mock.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(150));
                mock.set(&moving, 0.0);
                mock.set(&stop, 0.0);
            })
        };

        let report = monitor.wait_for_motion_complete().unwrap();
        operator.join().unwrap();
        assert_eq!(report.pauses, 1);
        assert!(report.paused >= Duration::from_millis(100));
        assert!(report.active() < Duration::from_millis(50));
    }

    #[test]
    fn test_no_timeout_when_disabled() {
        let (_, arm) = mock_arm();
        let (monitor, _) = monitor(arm, 5, 0);
        assert_eq!(monitor.timeout(), None);
        assert_eq!(monitor.poll_interval(), Duration::from_millis(5));
    }

    #[test]
    fn test_cancel_while_moving() {
        let (mock, arm) = mock_arm();
        mock.set(&pv(PvName::CheckMoving), 1.0);
        let (monitor, cancel) = monitor(arm, 2, 0);

        let remote = cancel.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let start = Instant::now();
        let err = monitor.wait_for_motion_complete().unwrap_err();
        handle.join().unwrap();
        assert!(matches!(err, MonitorError::Aborted));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_cancel_while_parked() {
        let (mock, arm) = mock_arm();
        mock.set(&pv(PvName::StopMove), 1.0);
        let (monitor, cancel) = monitor(arm, 2, 0);

        let remote = cancel.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let err = monitor.wait_for_resume().unwrap_err();
        handle.join().unwrap();
        assert!(matches!(err, MonitorError::Aborted));
    }

    #[test]
    fn test_resume_returns_immediately_when_running() {
        let (mock, arm) = mock_arm();
        let (monitor, _) = monitor(arm, 50, 0);

        let paused = monitor.wait_for_resume().unwrap();
        assert!(paused < Duration::from_millis(50));
        assert_eq!(mock.get_count(&pv(PvName::StopMove)), 1);
    }

    #[test]
    fn test_pass_gate() {
        let (mock, arm) = mock_arm();
        let stop = pv(PvName::StopMove);
        let (monitor, _) = monitor(arm, 1, 0);

        assert_eq!(monitor.pass_gate().unwrap(), Duration::ZERO);

        mock.script(&stop, [1.0, 1.0, 0.0]);
        monitor.pass_gate().unwrap();
        assert_eq!(mock.get_count(&stop), 4);
    }

    #[test]
    fn test_status_read_failure() {
        let (mock, arm) = mock_arm();
        mock.fail_get(&pv(PvName::CheckMoving));
        let (monitor, _) = monitor(arm, 1, 100);

        assert!(matches!(
            monitor.wait_for_motion_complete(),
            Err(MonitorError::Status(DriverError::Transport(_)))
        ));
    }

    #[test]
    fn test_undecodable_flag() {
        let (mock, arm) = mock_arm();
        mock.script(&pv(PvName::CheckMoving), [0.0]);
        mock.set(&pv(PvName::StopMove), 0.5);
        let (monitor, _) = monitor(arm, 1, 100);

        assert!(matches!(
            monitor.wait_for_motion_complete(),
            Err(MonitorError::Status(DriverError::Pv(_)))
        ));
    }
}
