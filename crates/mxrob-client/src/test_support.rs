//! 单元测试共用的 Mock 机械臂

use crate::config::CycleConfig;
use mxrob_driver::PvArm;
use mxrob_pv::{LoopIndex, PvName, PvTable};
use mxrob_transport::MockTransport;
use std::sync::Arc;

pub type MockArm = PvArm<Arc<MockTransport>>;

pub fn pv(name: PvName) -> String {
    PvTable::default().full_name(name).to_string()
}

pub fn mock_arm() -> (Arc<MockTransport>, Arc<MockArm>) {
    let mock = Arc::new(MockTransport::new());
    let arm = Arc::new(PvArm::new(mock.clone(), PvTable::default()));
    (mock, arm)
}

/// 每个运动命令写入后，`CheckMoving` 依次读到 1、0
pub fn react_motions(mock: &MockTransport) {
    let moving = pv(PvName::CheckMoving);
    for name in [PvName::PickLoop, PvName::PlaceLoop, PvName::RetrieveLoop] {
        mock.react(&pv(name), &moving, [1.0, 0.0]);
    }
}

/// 毫秒级轮询、无等待的快速配置
pub fn fast_config() -> CycleConfig {
    let mut config = CycleConfig::default();
    config.monitor.poll_interval_ms = 1;
    config.monitor.motion_timeout_ms = 2_000;
    config.sequencer.close_settle_ms = 0;
    config
}

pub fn index(n: u32) -> LoopIndex {
    LoopIndex::new(n).unwrap()
}
