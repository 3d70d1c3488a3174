//! # MXROB CLI
//!
//! 样品杜瓦机械臂命令行工具。
//!
//! ```bash
//! # 配置 PV 前缀
//! mxrob-cli config set --prefix MXROB:Staubli2
//!
//! # 批量运行（上电 → 1,2,3 → 断电）
//! mxrob-cli run --slots 1,2,3
//!
//! # 另一个终端：暂停/恢复当前运动
//! mxrob-cli stop
//! mxrob-cli resume
//!
//! # 不连 IOC，在模拟后端上演练
//! mxrob-cli run --backend sim --yes
//! ```

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod events;
mod safety;
mod settings;
mod validation;

use commands::{
    ConfigCommand, CycleCommand, OperatorAction, OperatorCommand, PowerCommand, RunCommand,
    Session, StatusCommand,
};

/// MXROB CLI - 样品杜瓦机械臂命令行工具
#[derive(Parser, Debug)]
#[command(name = "mxrob-cli")]
#[command(about = "Command-line interface for the sample dewar robot arm", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 <config_dir>/mxrob/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 日志详细程度（-v, -vv, -vvv）
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 批量运行：上电 → 逐个样品位循环 → 断电
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 对单个样品位执行一次循环
    Cycle {
        #[command(flatten)]
        args: CycleCommand,
    },

    /// 上电/断电
    Power {
        #[command(flatten)]
        args: PowerCommand,
    },

    /// 请求停止当前运动
    Stop {
        #[command(flatten)]
        args: OperatorCommand,
    },

    /// 恢复已停止的运动
    Resume {
        #[command(flatten)]
        args: OperatorCommand,
    },

    /// 删除当前运动
    Delete {
        #[command(flatten)]
        args: OperatorCommand,
    },

    /// 重启当前运动
    Restart {
        #[command(flatten)]
        args: OperatorCommand,
    },

    /// 查询运动状态
    Status {
        #[command(flatten)]
        args: StatusCommand,
    },
}

fn log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,mxrob_cli=info",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = mxrob_sdk::init_logging(log_directive(cli.verbose)) {
        eprintln!("⚠️  日志初始化失败: {e}");
    }

    // config 子命令不校验取值，便于修复非法配置
    let validate = !matches!(cli.command, Commands::Config(_));
    let session = Session::load(cli.config.as_deref(), validate)?;

    match cli.command {
        Commands::Config(cmd) => cmd.execute(&session),
        Commands::Run { args } => args.execute(&session),
        Commands::Cycle { args } => args.execute(&session),
        Commands::Power { args } => args.execute(&session),
        Commands::Stop { args } => args.execute(OperatorAction::Stop, &session),
        Commands::Resume { args } => args.execute(OperatorAction::Resume, &session),
        Commands::Delete { args } => args.execute(OperatorAction::Delete, &session),
        Commands::Restart { args } => args.execute(OperatorAction::Restart, &session),
        Commands::Status { args } => args.execute(&session),
    }
}
