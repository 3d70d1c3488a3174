//! 批量运行命令
//!
//! 上电 → 逐个样品位循环 → 断电。上电前需要人工确认（`--yes` 跳过）。

use super::cycle::print_cycle;
use super::{ConnectionArgs, Session, attach_events, finish_events};
use crate::safety::{confirm_power_on, install_interrupt_handler};
use crate::validation::parse_loop_index;
use anyhow::{Context, Result};
use clap::Args;
use mxrob_sdk::{CancelToken, CycleSequencer, LoopIndex};
use std::path::PathBuf;

/// 批量运行参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 样品位列表（逗号分隔，默认取配置文件 `cycle.batch.slots`）
    #[arg(short, long, value_delimiter = ',', value_parser = parse_loop_index)]
    pub slots: Vec<LoopIndex>,

    /// 跳过上电确认
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// 循环失败时断电（覆盖配置）
    #[arg(long)]
    pub power_off_on_failure: bool,

    /// 事件输出（JSON Lines，`-` 表示 stdout）
    #[arg(long)]
    pub events: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl RunCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let settings = session.effective(&self.connection);
        let mut config = settings.cycle.clone();
        if self.power_off_on_failure {
            config.batch.power_off_on_failure = true;
        }
        let slots = if self.slots.is_empty() {
            config.batch.slots.clone()
        } else {
            self.slots.clone()
        };

        if slots.is_empty() {
            println!("ℹ️  没有要处理的样品位");
            return Ok(());
        }

        if !confirm_power_on(&settings.connection.prefix, self.yes)? {
            println!("❌ 操作已取消");
            return Ok(());
        }

        let arm = session.connect(&self.connection)?;
        let cancel = CancelToken::new();
        install_interrupt_handler(&cancel)?;

        let mut sequencer = CycleSequencer::new(arm, config, cancel);
        let writer = attach_events(&mut sequencer, self.events.as_deref())?;

        println!("🚀 批量运行 {} 个样品位", slots.len());
        let result = sequencer.run_batch(&slots);
        drop(sequencer);
        finish_events(writer)?;

        let report = result.context("Batch aborted")?;
        for cycle in &report.completed {
            print_cycle(cycle);
        }

        if report.powered_off {
            println!("🔌 已断电");
        } else {
            println!("⚠️  机械臂保持上电");
        }

        match report.failure {
            None => {
                println!("✅ 批量完成: {}/{}", report.completed.len(), slots.len());
                Ok(())
            },
            Some(failure) => {
                println!(
                    "❌ 批量中止: 完成 {}/{}",
                    report.completed.len(),
                    slots.len()
                );
                Err(anyhow::Error::new(failure).context("Batch stopped on first failed cycle"))
            },
        }
    }
}
