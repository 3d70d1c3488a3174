//! CLI 配置文件
//!
//! 默认位置 `<config_dir>/mxrob/config.toml`，可用 `--config` 覆盖：
//!
//! ```toml
//! [connection]
//! prefix = "MXROB:Staubli2"
//! backend = "ca"          # ca | sim
//! ca_timeout_ms = 5000
//!
//! [cycle.monitor]
//! poll_interval_ms = 100
//! ```

use anyhow::{Context, Result};
use clap::ValueEnum;
use mxrob_sdk::client::CycleConfig;
use mxrob_sdk::pv::DEFAULT_PREFIX;
use mxrob_sdk::transport::SimConfig;
use mxrob_sdk::{ArmBuilder, Backend};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 传输后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// EPICS 命令行工具（caput/caget）
    #[default]
    Ca,
    /// 进程内模拟 IOC
    Sim,
}

/// 连接配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionSettings {
    pub prefix: String,
    pub backend: BackendKind,
    /// caput/caget 回执超时
    pub ca_timeout_ms: u64,
    /// caput/caget 所在目录（默认从 PATH 查找）
    pub tool_dir: Option<PathBuf>,
    /// 模拟 IOC：命令回执到开始运动的延迟
    pub sim_start_latency_ms: u64,
    /// 模拟 IOC：每个运动的持续时间
    pub sim_move_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        let sim = SimConfig::default();
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            backend: BackendKind::default(),
            ca_timeout_ms: 5_000,
            tool_dir: None,
            sim_start_latency_ms: sim.start_latency.as_millis() as u64,
            sim_move_ms: sim.move_duration.as_millis() as u64,
        }
    }
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliSettings {
    pub connection: ConnectionSettings,
    pub cycle: CycleConfig,
}

impl CliSettings {
    /// 默认配置文件路径
    pub fn default_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().context("Cannot determine the user config directory")?;
        path.push("mxrob");
        path.push("config.toml");
        Ok(path)
    }

    /// 解析 `--config` 或默认路径
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// 加载并校验配置（文件不存在时返回默认值）
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Self::load_unchecked(path)?;
        settings.validate(path)?;
        Ok(settings)
    }

    /// 只解析、不校验取值
    ///
    /// 供 `config` 子命令使用，使取值非法的文件仍可通过 `config set` 修复。
    pub fn load_unchecked(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// 校验循环参数（`path` 仅用于错误信息）
    pub fn validate(&self, path: &Path) -> Result<()> {
        self.cycle
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// 保存配置
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, format!("# MXROB CLI configuration\n\n{content}"))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// 按连接配置构造 Builder
    pub fn arm_builder(&self) -> ArmBuilder {
        let connection = &self.connection;
        let backend = match connection.backend {
            BackendKind::Ca => Backend::CaTools {
                timeout: Duration::from_millis(connection.ca_timeout_ms),
                tool_dir: connection.tool_dir.clone(),
            },
            BackendKind::Sim => Backend::Simulated(SimConfig {
                start_latency: Duration::from_millis(connection.sim_start_latency_ms),
                move_duration: Duration::from_millis(connection.sim_move_ms),
                ..SimConfig::default()
            }),
        };
        ArmBuilder::new()
            .prefix(connection.prefix.clone())
            .backend(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CliSettings::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, CliSettings::default());
        assert_eq!(settings.connection.prefix, "MXROB:Staubli2");
        assert_eq!(settings.connection.backend, BackendKind::Ca);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = CliSettings::default();
        settings.connection.prefix = "BL12:Robot".to_string();
        settings.connection.backend = BackendKind::Sim;
        settings.cycle.sequencer.open_settle_ms = 200;
        settings.save(&path).unwrap();

        let loaded = CliSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[connection]\nbackend = \"sim\"\n\n[cycle.batch]\nslots = [2, 5]\n",
        )
        .unwrap();

        let settings = CliSettings::load(&path).unwrap();
        assert_eq!(settings.connection.backend, BackendKind::Sim);
        assert_eq!(settings.connection.ca_timeout_ms, 5_000);
        assert_eq!(settings.cycle.batch.slots.len(), 2);
        assert_eq!(settings.cycle.monitor.poll_interval_ms, 100);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[cycle.monitor]\npoll_interval_ms = 0\n").unwrap();
        assert!(CliSettings::load(&path).is_err());

        fs::write(&path, "[connection]\nbackend = \"usb\"\n").unwrap();
        assert!(CliSettings::load(&path).is_err());
    }

    #[test]
    fn test_unchecked_load_accepts_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[cycle.monitor]\npoll_interval_ms = 0\n").unwrap();

        let settings = CliSettings::load_unchecked(&path).unwrap();
        assert_eq!(settings.cycle.monitor.poll_interval_ms, 0);
        assert!(settings.validate(&path).is_err());
    }

    #[test]
    fn test_resolve_path_prefers_explicit() {
        let path = CliSettings::resolve_path(Some(Path::new("/tmp/x.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x.toml"));
    }
}
