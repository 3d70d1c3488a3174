//! 配置管理命令
//!
//! 读写 CLI 配置文件（连接参数和循环参数）

use super::Session;
use crate::settings::{BackendKind, CliSettings};
use crate::validation::parse_loop_index;
use anyhow::{Context, Result, bail};
use clap::Subcommand;
use mxrob_sdk::LoopIndex;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// PV 前缀
        #[arg(long)]
        prefix: Option<String>,

        /// 默认传输后端
        #[arg(long, value_enum)]
        backend: Option<BackendKind>,

        /// caput/caget 超时（毫秒）
        #[arg(long)]
        ca_timeout_ms: Option<u64>,

        /// 运动状态轮询间隔（毫秒）
        #[arg(long)]
        poll_interval_ms: Option<u64>,

        /// 单个运动的超时（毫秒，0 表示不限）
        #[arg(long)]
        motion_timeout_ms: Option<u64>,

        /// 放样目标位置
        #[arg(long)]
        place_destination: Option<u32>,

        /// 夹爪闭合后的等待（毫秒）
        #[arg(long)]
        close_settle_ms: Option<u64>,

        /// 夹爪张开后的等待（毫秒）
        #[arg(long)]
        open_settle_ms: Option<u64>,

        /// 默认批量样品位（逗号分隔）
        #[arg(long, value_delimiter = ',', value_parser = parse_loop_index)]
        slots: Option<Vec<LoopIndex>>,

        /// 批量失败时是否断电
        #[arg(long)]
        power_off_on_failure: Option<bool>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称（all, prefix, backend, slots, path）
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置
    Check,
}

impl ConfigCommand {
    pub fn execute(self, session: &Session) -> Result<()> {
        match self {
            ConfigCommand::Set {
                prefix,
                backend,
                ca_timeout_ms,
                poll_interval_ms,
                motion_timeout_ms,
                place_destination,
                close_settle_ms,
                open_settle_ms,
                slots,
                power_off_on_failure,
            } => {
                let mut settings = session.settings.clone();
                let mut changed = 0;

                if let Some(prefix) = prefix {
                    println!("✅ 设置 PV 前缀: {prefix}");
                    settings.connection.prefix = prefix;
                    changed += 1;
                }
                if let Some(backend) = backend {
                    println!("✅ 设置传输后端: {backend:?}");
                    settings.connection.backend = backend;
                    changed += 1;
                }
                if let Some(ms) = ca_timeout_ms {
                    println!("✅ 设置 CA 超时: {ms} ms");
                    settings.connection.ca_timeout_ms = ms;
                    changed += 1;
                }
                if let Some(ms) = poll_interval_ms {
                    println!("✅ 设置轮询间隔: {ms} ms");
                    settings.cycle.monitor.poll_interval_ms = ms;
                    changed += 1;
                }
                if let Some(ms) = motion_timeout_ms {
                    println!("✅ 设置运动超时: {ms} ms");
                    settings.cycle.monitor.motion_timeout_ms = ms;
                    changed += 1;
                }
                if let Some(dest) = place_destination {
                    println!("✅ 设置放样位置: {dest}");
                    settings.cycle.sequencer.place_destination = dest;
                    changed += 1;
                }
                if let Some(ms) = close_settle_ms {
                    println!("✅ 设置闭合等待: {ms} ms");
                    settings.cycle.sequencer.close_settle_ms = ms;
                    changed += 1;
                }
                if let Some(ms) = open_settle_ms {
                    println!("✅ 设置张开等待: {ms} ms");
                    settings.cycle.sequencer.open_settle_ms = ms;
                    changed += 1;
                }
                if let Some(slots) = slots {
                    println!("✅ 设置批量样品位: {}", format_slots(&slots));
                    settings.cycle.batch.slots = slots;
                    changed += 1;
                }
                if let Some(flag) = power_off_on_failure {
                    println!("✅ 设置失败时断电: {flag}");
                    settings.cycle.batch.power_off_on_failure = flag;
                    changed += 1;
                }

                if changed == 0 {
                    println!("ℹ️  没有要修改的配置项");
                    return Ok(());
                }

                settings.cycle.validate().context("Rejected new settings")?;
                settings.save(&session.settings_path)?;
                println!("💾 已保存到 {}", session.settings_path.display());
                Ok(())
            },

            ConfigCommand::Get { key } => {
                let settings = &session.settings;
                match key.as_str() {
                    "all" => {
                        let content = toml::to_string_pretty(settings)
                            .context("Failed to serialize settings")?;
                        println!("{content}");
                    },
                    "prefix" => println!("{}", settings.connection.prefix),
                    "backend" => println!("{:?}", settings.connection.backend),
                    "slots" => println!("{}", format_slots(&settings.cycle.batch.slots)),
                    "path" => println!("{}", session.settings_path.display()),
                    other => bail!("Unknown config key: {other}"),
                }
                Ok(())
            },

            ConfigCommand::Check => {
                let path = &session.settings_path;
                println!("📄 配置文件: {}", path.display());
                if path.exists() {
                    session.settings.validate(path)?;
                    println!("✅ 配置有效");
                } else {
                    println!("ℹ️  文件不存在，使用默认配置");
                }
                print_summary(&session.settings);
                Ok(())
            },
        }
    }
}

fn format_slots(slots: &[LoopIndex]) -> String {
    slots
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn print_summary(settings: &CliSettings) {
    let monitor = &settings.cycle.monitor;
    println!("  前缀: {}", settings.connection.prefix);
    println!("  后端: {:?}", settings.connection.backend);
    println!("  轮询间隔: {} ms", monitor.poll_interval_ms);
    match monitor.motion_timeout() {
        Some(timeout) => println!("  运动超时: {} ms", timeout.as_millis()),
        None => println!("  运动超时: 不限"),
    }
    println!("  批量样品位: {}", format_slots(&settings.cycle.batch.slots));
}
