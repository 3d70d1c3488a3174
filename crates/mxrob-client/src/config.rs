//! 循环配置
//!
//! TOML 格式，所有时间字段为整数毫秒：
//!
//! ```toml
//! [monitor]
//! poll_interval_ms = 100
//! motion_timeout_ms = 300000   # 0 表示不设超时
//!
//! [sequencer]
//! place_destination = 0        # 0 = 光束位
//! close_settle_ms = 500
//! open_settle_ms = 0
//!
//! [batch]
//! slots = [1, 2, 3, 4]
//! power_off_on_failure = false
//! ```
//!
//! 缺省的段或字段取默认值。

use crate::error::ConfigError;
use mxrob_pv::{BEAM_POSITION, LoopIndex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 运动监视器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 单次运动超时（毫秒，不计暂停时间；0 = 不限）
    pub motion_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            motion_timeout_ms: 300_000,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 运动超时（`None` 表示不限）
    pub fn motion_timeout(&self) -> Option<Duration> {
        (self.motion_timeout_ms > 0).then(|| Duration::from_millis(self.motion_timeout_ms))
    }
}

/// 序列器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequencerConfig {
    /// 放置目标位置
    pub place_destination: u32,
    /// 闭合夹爪后的等待时间（毫秒）
    pub close_settle_ms: u64,
    /// 张开夹爪后的等待时间（毫秒）
    pub open_settle_ms: u64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            place_destination: BEAM_POSITION,
            close_settle_ms: 500,
            open_settle_ms: 0,
        }
    }
}

impl SequencerConfig {
    pub fn close_settle(&self) -> Duration {
        Duration::from_millis(self.close_settle_ms)
    }

    pub fn open_settle(&self) -> Duration {
        Duration::from_millis(self.open_settle_ms)
    }
}

/// 批量运行配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// 依次处理的样品位
    pub slots: Vec<LoopIndex>,
    /// 循环失败后是否断电
    pub power_off_on_failure: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            slots: (1..=4).filter_map(|n| LoopIndex::new(n).ok()).collect(),
            power_off_on_failure: false,
        }
    }
}

/// 完整循环配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleConfig {
    pub monitor: MonitorConfig,
    pub sequencer: SequencerConfig,
    pub batch: BatchConfig,
}

impl CycleConfig {
    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: CycleConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 校验取值范围
    ///
    /// # 错误
    ///
    /// - `ConfigError::Invalid`: 轮询间隔为 0，或放置目标超出 IOC 记录范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "monitor.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if i32::try_from(self.sequencer.place_destination).is_err() {
            return Err(ConfigError::Invalid(format!(
                "sequencer.place_destination {} exceeds the PV range",
                self.sequencer.place_destination
            )));
        }
        Ok(())
    }
}
