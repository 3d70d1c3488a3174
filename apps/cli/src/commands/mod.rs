//! 命令定义和实现

pub mod config;
pub mod cycle;
pub mod operator;
pub mod power;
pub mod run;
pub mod status;

pub use config::ConfigCommand;
pub use cycle::CycleCommand;
pub use operator::{OperatorAction, OperatorCommand};
pub use power::PowerCommand;
pub use run::RunCommand;
pub use status::StatusCommand;

use crate::events::EventWriter;
use crate::settings::{BackendKind, CliSettings};
use anyhow::{Context, Result};
use clap::Args;
use mxrob_sdk::RemoteArm;
use mxrob_sdk::client::CycleSequencer;
use mxrob_sdk::driver::DynArm;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 连接参数（覆盖配置文件）
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// PV 前缀（如 MXROB:Staubli2）
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// 传输后端
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,
}

/// 一次 CLI 调用的上下文
#[derive(Debug, Clone)]
pub struct Session {
    pub settings: CliSettings,
    pub settings_path: PathBuf,
}

impl Session {
    /// 加载配置；`validate` 为 false 时只解析（`config` 子命令）
    pub fn load(explicit: Option<&Path>, validate: bool) -> Result<Self> {
        let settings_path = CliSettings::resolve_path(explicit)?;
        let settings = if validate {
            CliSettings::load(&settings_path)?
        } else {
            CliSettings::load_unchecked(&settings_path)?
        };
        Ok(Self {
            settings,
            settings_path,
        })
    }

    /// 合并命令行覆盖后的配置
    pub fn effective(&self, args: &ConnectionArgs) -> CliSettings {
        let mut settings = self.settings.clone();
        if let Some(prefix) = &args.prefix {
            settings.connection.prefix = prefix.clone();
        }
        if let Some(backend) = args.backend {
            settings.connection.backend = backend;
        }
        settings
    }

    /// 构造机械臂接口
    pub fn connect(&self, args: &ConnectionArgs) -> Result<Arc<DynArm>> {
        let settings = self.effective(args);
        eprintln!(
            "🔌 连接到 {} ({:?})...",
            settings.connection.prefix, settings.connection.backend
        );
        let arm = settings
            .arm_builder()
            .build()
            .context("Failed to set up the arm connection")?;
        Ok(Arc::new(arm))
    }
}

/// 按需把事件输出挂到序列器上
pub fn attach_events<A: RemoteArm + ?Sized>(
    sequencer: &mut CycleSequencer<A>,
    path: Option<&Path>,
) -> Result<Option<EventWriter>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let (recorder, writer) = EventWriter::spawn(path)?;
    sequencer.add_observer(Arc::new(recorder));
    Ok(Some(writer))
}

/// 等待事件输出写完
pub fn finish_events(writer: Option<EventWriter>) -> Result<()> {
    if let Some(writer) = writer {
        let count = writer.finish()?;
        tracing::debug!(count, "Event log written");
    }
    Ok(())
}
