//! 基于 PV 传输的 [`RemoteArm`] 实现

use crate::arm::{RemoteArm, Result};
use mxrob_pv::{
    ArmCommand, GripperAction, LoopIndex, OperatorCommand, PowerState, PvName, PvTable,
    decode_flag,
};
use mxrob_transport::PvTransport;
use tracing::{debug, trace};

/// PV 驱动的机械臂
///
/// 命令经 [`ArmCommand::to_write`] 编码后写入对应记录；状态读取经
/// [`decode_flag`] 严格解码（只接受 0/1）。
///
/// # 示例
///
/// ```
/// use mxrob_driver::{PvArm, RemoteArm};
/// use mxrob_pv::PvTable;
/// use mxrob_transport::{SimConfig, SimulatedIoc};
///
/// let ioc = SimulatedIoc::start(SimConfig::default()).unwrap();
/// let arm = PvArm::new(ioc, PvTable::default());
/// arm.set_power(true).unwrap();
/// assert!(!arm.is_moving().unwrap());
/// ```
pub struct PvArm<T: PvTransport> {
    transport: T,
    table: PvTable,
}

impl<T: PvTransport> PvArm<T> {
    pub fn new(transport: T, table: PvTable) -> Self {
        Self { transport, table }
    }

    /// 名称表
    pub fn table(&self) -> &PvTable {
        &self.table
    }

    /// 底层传输
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 编码并写入一条命令
    pub fn send(&self, command: ArmCommand) -> Result<()> {
        let write = command.to_write()?;
        let pv = self.table.full_name(write.pv);
        debug!(pv, value = write.value, "PV put");
        self.transport.put(pv, write.value)?;
        Ok(())
    }

    /// 读取一个 0/1 标志位记录
    pub fn read_flag(&self, name: PvName) -> Result<bool> {
        let pv = self.table.full_name(name);
        let raw = self.transport.get(pv)?;
        trace!(pv, raw, "PV get");
        Ok(decode_flag(name, raw)?)
    }
}

impl<T: PvTransport> RemoteArm for PvArm<T> {
    fn set_power(&self, on: bool) -> Result<()> {
        self.send(ArmCommand::Power(PowerState::from(on)))
    }

    fn command_pick(&self, loop_index: LoopIndex) -> Result<()> {
        self.send(ArmCommand::Pick(loop_index))
    }

    fn command_place(&self, dest_index: u32) -> Result<()> {
        self.send(ArmCommand::Place(dest_index))
    }

    fn command_retrieve(&self, loop_index: LoopIndex) -> Result<()> {
        self.send(ArmCommand::Retrieve(loop_index))
    }

    fn set_gripper(&self, action: GripperAction) -> Result<()> {
        self.send(ArmCommand::Gripper(action))
    }

    fn is_moving(&self) -> Result<bool> {
        self.read_flag(PvName::CheckMoving)
    }

    fn stop_requested(&self) -> Result<bool> {
        self.read_flag(PvName::StopMove)
    }

    fn stop_move(&self) -> Result<()> {
        self.send(ArmCommand::Operator(OperatorCommand::Stop))
    }

    fn resume_move(&self) -> Result<()> {
        self.send(ArmCommand::Operator(OperatorCommand::Resume))
    }

    fn delete_move(&self) -> Result<()> {
        self.send(ArmCommand::Operator(OperatorCommand::Delete))
    }

    fn restart_move(&self) -> Result<()> {
        self.send(ArmCommand::Operator(OperatorCommand::Restart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DriverError;
    use mxrob_pv::PvError;
    use mxrob_transport::{MockTransport, TransportError};
    use std::sync::Arc;

    const PREFIX: &str = "TEST:Arm";

    fn mock_arm() -> (Arc<MockTransport>, PvArm<Arc<MockTransport>>) {
        let mock = Arc::new(MockTransport::new());
        let arm = PvArm::new(mock.clone(), PvTable::new(PREFIX));
        (mock, arm)
    }

    #[test]
    fn test_command_encoding() {
        let (mock, arm) = mock_arm();
        arm.set_power(true).unwrap();
        arm.command_pick(LoopIndex::new(3).unwrap()).unwrap();
        arm.set_gripper(GripperAction::Close).unwrap();
        arm.command_place(0).unwrap();
        arm.set_gripper(GripperAction::Open).unwrap();
        arm.command_retrieve(LoopIndex::new(3).unwrap()).unwrap();
        arm.set_power(false).unwrap();

        assert_eq!(
            mock.puts(),
            vec![
                ("TEST:Arm:Power.VAL".to_string(), 1),
                ("TEST:Arm:PickLoop.VAL".to_string(), 3),
                ("TEST:Arm:Gripper.VAL".to_string(), 0),
                ("TEST:Arm:PlaceLoop.VAL".to_string(), 0),
                ("TEST:Arm:Gripper.VAL".to_string(), 1),
                ("TEST:Arm:RetrieveLoop.VAL".to_string(), 3),
                ("TEST:Arm:Power.VAL".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_operator_commands() {
        let (mock, arm) = mock_arm();
        arm.stop_move().unwrap();
        arm.resume_move().unwrap();
        arm.delete_move().unwrap();
        arm.restart_move().unwrap();

        assert_eq!(
            mock.puts(),
            vec![
                ("TEST:Arm:StopMove.VAL".to_string(), 1),
                ("TEST:Arm:StopMove.VAL".to_string(), 0),
                ("TEST:Arm:DeleteMove.VAL".to_string(), 1),
                ("TEST:Arm:RestartMove.VAL".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_status_reads() {
        let (mock, arm) = mock_arm();
        mock.script("TEST:Arm:CheckMoving.VAL", [1.0, 0.0]);
        mock.set("TEST:Arm:StopMove.VAL", 1.0);

        assert!(arm.is_moving().unwrap());
        assert!(!arm.is_moving().unwrap());
        assert!(arm.stop_requested().unwrap());

        // 每次调用都是一次新的读取
        assert_eq!(mock.get_count("TEST:Arm:CheckMoving.VAL"), 2);
    }

    #[test]
    fn test_status_snapshot() {
        let (mock, arm) = mock_arm();
        mock.set("TEST:Arm:CheckMoving.VAL", 1.0);
        let status = arm.status().unwrap();
        assert!(status.moving);
        assert!(!status.stop_requested);
    }

    #[test]
    fn test_invalid_flag_value() {
        let (mock, arm) = mock_arm();
        mock.set("TEST:Arm:CheckMoving.VAL", 2.0);
        let err = arm.is_moving().unwrap_err();
        assert!(matches!(
            err,
            DriverError::Pv(PvError::InvalidFlag {
                pv: PvName::CheckMoving,
                ..
            })
        ));
    }

    #[test]
    fn test_rejected_put_propagates() {
        let (mock, arm) = mock_arm();
        mock.fail_put("TEST:Arm:Gripper.VAL", "arm busy");
        let err = arm.set_gripper(GripperAction::Open).unwrap_err();
        assert!(err.is_rejected());
    }

    #[test]
    fn test_disconnected_read_propagates() {
        let (mock, arm) = mock_arm();
        mock.fail_get("TEST:Arm:StopMove.VAL");
        let err = arm.stop_requested().unwrap_err();
        assert!(matches!(
            err,
            DriverError::Transport(TransportError::Disconnected { .. })
        ));
    }

    #[test]
    fn test_place_out_of_range() {
        let (mock, arm) = mock_arm();
        let err = arm.command_place(u32::MAX).unwrap_err();
        assert!(matches!(
            err,
            DriverError::Pv(PvError::ValueOutOfRange { .. })
        ));
        assert!(mock.puts().is_empty());
    }
}
