//! 电源命令

use super::{ConnectionArgs, Session};
use crate::safety::confirm_power_on;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use mxrob_sdk::RemoteArm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerSwitch {
    On,
    Off,
}

/// 电源命令参数
#[derive(Args, Debug)]
pub struct PowerCommand {
    #[arg(value_enum)]
    pub state: PowerSwitch,

    /// 跳过上电确认
    #[arg(short = 'y', long)]
    pub yes: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl PowerCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let on = self.state == PowerSwitch::On;
        if on {
            let prefix = session.effective(&self.connection).connection.prefix;
            if !confirm_power_on(&prefix, self.yes)? {
                println!("❌ 操作已取消");
                return Ok(());
            }
        }

        let arm = session.connect(&self.connection)?;
        arm.set_power(on).context("Power command rejected")?;
        println!("✅ 已{}", if on { "上电" } else { "断电" });
        Ok(())
    }
}
