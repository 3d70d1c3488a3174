//! 状态查询命令

use super::{ConnectionArgs, Session};
use anyhow::{Context, Result};
use clap::Args;
use mxrob_sdk::RemoteArm;

#[derive(Args, Debug)]
pub struct StatusCommand {
    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl StatusCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let arm = session.connect(&self.connection)?;
        let status = arm.status().context("Failed to read arm status")?;

        if self.json {
            let value = serde_json::json!({
                "prefix": arm.table().prefix(),
                "moving": status.moving,
                "stop_requested": status.stop_requested,
            });
            println!("{value}");
        } else {
            println!("📊 {}", arm.table().prefix());
            println!("  运动中: {}", if status.moving { "是" } else { "否" });
            println!(
                "  操作员停止: {}",
                if status.stop_requested { "是" } else { "否" }
            );
        }
        Ok(())
    }
}
