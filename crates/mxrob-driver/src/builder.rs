//! Builder 模式实现
//!
//! 提供链式构造 [`PvArm`] 实例的便捷方式。

use crate::error::DriverError;
use crate::pv_arm::PvArm;
use mxrob_pv::{DEFAULT_PREFIX, PvTable};
use mxrob_transport::{CaToolsTransport, PvTransport, SimConfig, SimulatedIoc};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// 传输后端选择
#[derive(Debug, Clone)]
pub enum Backend {
    /// EPICS 命令行工具（`caput`/`caget`）
    CaTools {
        /// 回执/连接超时
        timeout: Duration,
        /// 工具所在目录（`None` 表示从 `PATH` 查找）
        tool_dir: Option<PathBuf>,
    },
    /// 进程内模拟 IOC（前缀由 Builder 覆盖）
    Simulated(SimConfig),
}

impl Default for Backend {
    fn default() -> Self {
        Backend::CaTools {
            timeout: Duration::from_secs(5),
            tool_dir: None,
        }
    }
}

/// 构建完成的机械臂类型
pub type DynArm = PvArm<Box<dyn PvTransport>>;

/// ArmBuilder（链式构造）
///
/// # 示例
///
/// ```
/// use mxrob_driver::{ArmBuilder, Backend, RemoteArm};
/// use mxrob_transport::SimConfig;
///
/// let arm = ArmBuilder::new()
///     .prefix("BL:Robot")
///     .backend(Backend::Simulated(SimConfig::default()))
///     .build()
///     .unwrap();
/// assert_eq!(arm.table().prefix(), "BL:Robot");
/// assert!(!arm.is_moving().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct ArmBuilder {
    prefix: String,
    backend: Backend,
}

impl ArmBuilder {
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            backend: Backend::default(),
        }
    }

    /// 设置 PV 前缀（可选，默认 `MXROB:Staubli2`）
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// 设置传输后端（可选，默认 CA 命令行工具）
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// 构建机械臂实例
    ///
    /// # 错误
    ///
    /// - `DriverError::InvalidConfig`: 前缀为空
    /// - `DriverError::Transport`: 模拟 IOC 线程启动失败
    pub fn build(self) -> Result<DynArm, DriverError> {
        let prefix = self.prefix.trim().trim_end_matches(':');
        if prefix.is_empty() {
            return Err(DriverError::InvalidConfig(
                "PV prefix must not be empty".to_string(),
            ));
        }
        let table = PvTable::new(prefix);

        let transport: Box<dyn PvTransport> = match self.backend {
            Backend::CaTools { timeout, tool_dir } => {
                let transport = match tool_dir {
                    Some(dir) => CaToolsTransport::with_tools(dir.join("caput"), dir.join("caget")),
                    None => CaToolsTransport::new(),
                };
                info!(prefix, ?timeout, "Using EPICS command-line tools backend");
                Box::new(transport.timeout(timeout))
            },
            Backend::Simulated(config) => {
                let config = SimConfig {
                    prefix: prefix.to_string(),
                    ..config
                };
                info!(prefix, "Using simulated IOC backend");
                Box::new(SimulatedIoc::start(config)?)
            },
        };

        Ok(PvArm::new(transport, table))
    }
}

impl Default for ArmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RemoteArm;

    #[test]
    fn test_builder_defaults() {
        let builder = ArmBuilder::new();
        assert_eq!(builder.prefix, DEFAULT_PREFIX);
        assert!(matches!(builder.backend, Backend::CaTools { .. }));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let result = ArmBuilder::new()
            .prefix(" : ")
            .backend(Backend::Simulated(SimConfig::default()))
            .build();
        assert!(matches!(result, Err(DriverError::InvalidConfig(_))));
    }

    #[test]
    fn test_simulated_backend_uses_builder_prefix() {
        let arm = ArmBuilder::new()
            .prefix("SIM:Arm:")
            .backend(Backend::Simulated(SimConfig::default()))
            .build()
            .unwrap();
        assert_eq!(arm.table().prefix(), "SIM:Arm");
        arm.set_power(true).unwrap();
        assert!(!arm.stop_requested().unwrap());
    }

    #[test]
    fn test_catools_backend_missing_tools() {
        let arm = ArmBuilder::new()
            .backend(Backend::CaTools {
                timeout: Duration::from_millis(100),
                tool_dir: Some(PathBuf::from("/nonexistent/mxrob/bin")),
            })
            .build()
            .unwrap();
        assert!(matches!(
            arm.is_moving(),
            Err(DriverError::Transport(_))
        ));
    }
}
