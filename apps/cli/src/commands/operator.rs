//! 操作员命令：停止/恢复/删除/重启当前运动
//!
//! 与运行中的批量互不干扰：序列器看到 `stopRequested` 后挂起，
//! 恢复后继续。

use super::{ConnectionArgs, Session};
use anyhow::{Context, Result};
use clap::Args;
use mxrob_sdk::RemoteArm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorAction {
    Stop,
    Resume,
    Delete,
    Restart,
}

impl OperatorAction {
    fn label(self) -> &'static str {
        match self {
            OperatorAction::Stop => "🛑 停止",
            OperatorAction::Resume => "▶️  恢复",
            OperatorAction::Delete => "🗑️  删除",
            OperatorAction::Restart => "🔁 重启",
        }
    }
}

/// 操作员命令参数
#[derive(Args, Debug, Default)]
pub struct OperatorCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl OperatorCommand {
    pub fn execute(&self, action: OperatorAction, session: &Session) -> Result<()> {
        let arm = session.connect(&self.connection)?;
        println!("{} 当前运动...", action.label());

        let result = match action {
            OperatorAction::Stop => arm.stop_move(),
            OperatorAction::Resume => arm.resume_move(),
            OperatorAction::Delete => arm.delete_move(),
            OperatorAction::Restart => arm.restart_move(),
        };
        result.with_context(|| format!("{action:?} command rejected"))?;

        println!("✅ 完成");
        Ok(())
    }
}
