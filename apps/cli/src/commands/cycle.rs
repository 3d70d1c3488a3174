//! 单次循环命令
//!
//! 对一个样品位执行 pick → close → place → retrieve → open。
//! 不改变电源状态，机械臂需已上电。

use super::{ConnectionArgs, Session, attach_events, finish_events};
use crate::safety::install_interrupt_handler;
use crate::validation::parse_loop_index;
use anyhow::{Context, Result};
use clap::Args;
use mxrob_sdk::client::CycleReport;
use mxrob_sdk::{CancelToken, CycleSequencer, LoopIndex};
use std::path::PathBuf;

/// 单次循环参数
#[derive(Args, Debug)]
pub struct CycleCommand {
    /// 样品位索引（≥ 1）
    #[arg(value_parser = parse_loop_index)]
    pub loop_index: LoopIndex,

    /// 事件输出（JSON Lines，`-` 表示 stdout）
    #[arg(long)]
    pub events: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl CycleCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let arm = session.connect(&self.connection)?;
        let cancel = CancelToken::new();
        install_interrupt_handler(&cancel)?;

        let mut sequencer = CycleSequencer::new(arm, session.settings.cycle.clone(), cancel);
        let writer = attach_events(&mut sequencer, self.events.as_deref())?;

        println!("🔄 样品位 {} 开始循环", self.loop_index);
        let result = sequencer.run_cycle(self.loop_index);
        drop(sequencer);
        finish_events(writer)?;

        let report = result.context("Cycle failed")?;
        print_cycle(&report);
        Ok(())
    }
}

/// 打印单次循环结果
pub fn print_cycle(report: &CycleReport) {
    println!(
        "✅ 样品位 {} 完成，用时 {:.1} s",
        report.loop_index,
        report.elapsed.as_secs_f64()
    );
    for step in &report.steps {
        match step.motion {
            Some(motion) => println!(
                "  {:<14} {:>7.2} s  轮询 {} 次，暂停 {} 次",
                step.step.as_str(),
                step.elapsed.as_secs_f64(),
                motion.polls,
                motion.pauses
            ),
            None => println!(
                "  {:<14} {:>7.2} s",
                step.step.as_str(),
                step.elapsed.as_secs_f64()
            ),
        }
    }
    let pauses = report.pauses();
    if pauses > 0 {
        println!("  ⏸️  期间操作员暂停 {pauses} 次");
    }
}
