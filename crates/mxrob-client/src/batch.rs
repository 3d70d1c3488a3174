//! 批量运行：上电 → 逐个样品位执行循环 → 断电
//!
//! 第一个失败的循环终止整批。失败时默认保持上电，便于操作员现场处理；
//! `batch.power_off_on_failure = true` 时改为断电。

use crate::error::{BatchError, CycleError};
use crate::sequencer::{CycleReport, CycleSequencer};
use mxrob_driver::RemoteArm;
use mxrob_pv::LoopIndex;
use tracing::{info, warn};

/// 批量运行结果
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 已完成的循环（按执行顺序）
    pub completed: Vec<CycleReport>,
    /// 终止整批的失败
    pub failure: Option<CycleError>,
    /// 结束时是否已断电
    pub powered_off: bool,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// 已完成的样品位
    pub fn completed_slots(&self) -> Vec<LoopIndex> {
        self.completed.iter().map(|c| c.loop_index).collect()
    }
}

impl<A: RemoteArm + ?Sized> CycleSequencer<A> {
    /// 按配置的样品位列表批量运行
    pub fn run_configured_batch(&self) -> Result<BatchReport, BatchError> {
        let slots = self.config.batch.slots.clone();
        self.run_batch(&slots)
    }

    /// 批量运行
    ///
    /// # 错误
    ///
    /// 只有电源控制失败才返回 `Err`；循环失败记录在
    /// [`BatchReport::failure`] 中。
    pub fn run_batch(&self, slots: &[LoopIndex]) -> Result<BatchReport, BatchError> {
        let slot_list: Vec<u32> = slots.iter().map(|s| s.get()).collect();
        info!(slots = ?slot_list, "Batch started, powering on");
        self.arm.set_power(true).map_err(BatchError::PowerOn)?;

        let mut report = BatchReport::default();
        for &loop_index in slots {
            match self.run_cycle(loop_index) {
                Ok(cycle) => report.completed.push(cycle),
                Err(err) => {
                    report.failure = Some(err);
                    break;
                },
            }
        }

        if report.is_success() || self.config.batch.power_off_on_failure {
            self.arm.set_power(false).map_err(BatchError::PowerOff)?;
            report.powered_off = true;
            info!(completed = report.completed.len(), "Batch finished, arm powered off");
        } else {
            warn!(
                completed = report.completed.len(),
                "Batch stopped on failure, arm left powered on"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use crate::test_support::*;
    use crate::types::CycleStep;
    use mxrob_pv::PvName;

    #[test]
    fn test_batch_default_slots() {
        let (mock, arm) = mock_arm();
        react_motions(&mock);
        let sequencer = CycleSequencer::new(arm, fast_config(), CancelToken::new());

        let report = sequencer.run_configured_batch().unwrap();
        assert!(report.is_success());
        assert!(report.powered_off);
        assert_eq!(report.completed_slots(), vec![index(1), index(2), index(3), index(4)]);

        let puts = mock.puts();
        assert_eq!(puts.first(), Some(&(pv(PvName::Power), 1)));
        assert_eq!(puts.last(), Some(&(pv(PvName::Power), 0)));
        // 上电 + 4 × 5 条命令 + 断电
        assert_eq!(puts.len(), 22);
    }

    #[test]
    fn test_batch_stops_on_failure_and_keeps_power() {
        let (mock, arm) = mock_arm();
        react_motions(&mock);
        let sequencer = CycleSequencer::new(arm, fast_config(), CancelToken::new());

        let report = sequencer.run_batch(&[index(1)]).unwrap();
        assert!(report.is_success());

        mock.clear_journal();
        mock.fail_put(&pv(PvName::PickLoop), "dewar slot empty");
        let report = sequencer.run_batch(&[index(3), index(4)]).unwrap();
        assert!(!report.is_success());
        assert!(!report.powered_off);
        assert!(report.completed.is_empty());
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.step(), CycleStep::Pick);
        assert_eq!(failure.loop_index(), index(3));

        // 只有上电，没有断电，也没有处理 4 号位
        assert_eq!(mock.puts(), vec![(pv(PvName::Power), 1)]);
    }

    #[test]
    fn test_power_off_on_failure() {
        let (mock, arm) = mock_arm();
        mock.fail_put(&pv(PvName::PickLoop), "rejected");
        let mut config = fast_config();
        config.batch.power_off_on_failure = true;
        let sequencer = CycleSequencer::new(arm, config, CancelToken::new());

        let report = sequencer.run_batch(&[index(1)]).unwrap();
        assert!(!report.is_success());
        assert!(report.powered_off);
        assert_eq!(
            mock.puts(),
            vec![(pv(PvName::Power), 1), (pv(PvName::Power), 0)]
        );
    }

    #[test]
    fn test_power_on_failure() {
        let (mock, arm) = mock_arm();
        mock.fail_put(&pv(PvName::Power), "interlock");
        let sequencer = CycleSequencer::new(arm, fast_config(), CancelToken::new());

        let err = sequencer.run_batch(&[index(1)]).unwrap_err();
        assert!(matches!(err, BatchError::PowerOn(_)));
        assert!(mock.puts().is_empty());
    }
}
