//! 内存 Mock 传输（仅 feature `mock`）
//!
//! - 寄存器：未写入/未脚本化的 PV 读回 0
//! - 读脚本：按顺序弹出预设值，耗尽后保持最后一个值
//! - 联动：写入某个 PV 时向另一个 PV 的读脚本追加值，模拟"命令 → 运动"
//! - 故障注入：指定 PV 的写入/读取返回错误
//! - 操作日志：按发生顺序记录所有读写，用于验证命令与屏障的先后关系

use crate::{PvTransport, TransportError};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};

/// 一次 Mock 操作
#[derive(Debug, Clone, PartialEq)]
pub enum MockOp {
    Put { pv: String, value: i32 },
    Get { pv: String, value: f64 },
}

impl MockOp {
    pub fn pv(&self) -> &str {
        match self {
            MockOp::Put { pv, .. } | MockOp::Get { pv, .. } => pv,
        }
    }

    pub fn is_put(&self) -> bool {
        matches!(self, MockOp::Put { .. })
    }
}

#[derive(Debug, Default)]
struct MockState {
    registers: HashMap<String, f64>,
    scripts: HashMap<String, VecDeque<f64>>,
    reactions: HashMap<String, Vec<(String, Vec<f64>)>>,
    put_failures: HashMap<String, String>,
    get_failures: HashSet<String>,
    journal: Vec<MockOp>,
}

/// 内存 Mock 传输
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接设置寄存器值
    pub fn set(&self, pv: &str, value: f64) {
        self.state.lock().registers.insert(pv.to_string(), value);
    }

    /// 追加读脚本
    pub fn script(&self, pv: &str, values: impl IntoIterator<Item = f64>) {
        self.state
            .lock()
            .scripts
            .entry(pv.to_string())
            .or_default()
            .extend(values);
    }

    /// 每次写入 `trigger` 时，向 `target` 的读脚本追加 `values`
    pub fn react(&self, trigger: &str, target: &str, values: impl IntoIterator<Item = f64>) {
        self.state
            .lock()
            .reactions
            .entry(trigger.to_string())
            .or_default()
            .push((target.to_string(), values.into_iter().collect()));
    }

    /// 令指定 PV 的写入失败
    pub fn fail_put(&self, pv: &str, message: impl Into<String>) {
        self.state
            .lock()
            .put_failures
            .insert(pv.to_string(), message.into());
    }

    /// 令指定 PV 的读取失败（表现为连接断开）
    pub fn fail_get(&self, pv: &str) {
        self.state.lock().get_failures.insert(pv.to_string());
    }

    /// 当前寄存器值
    pub fn value(&self, pv: &str) -> f64 {
        self.state.lock().registers.get(pv).copied().unwrap_or(0.0)
    }

    /// 全部操作日志
    pub fn journal(&self) -> Vec<MockOp> {
        self.state.lock().journal.clone()
    }

    /// 成功的写入（按顺序）
    pub fn puts(&self) -> Vec<(String, i32)> {
        self.state
            .lock()
            .journal
            .iter()
            .filter_map(|op| match op {
                MockOp::Put { pv, value } => Some((pv.clone(), *value)),
                MockOp::Get { .. } => None,
            })
            .collect()
    }

    /// 指定 PV 的读取次数
    pub fn get_count(&self, pv: &str) -> usize {
        self.state
            .lock()
            .journal
            .iter()
            .filter(|op| matches!(op, MockOp::Get { pv: p, .. } if p == pv))
            .count()
    }

    /// 清空操作日志（寄存器和脚本保留）
    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }
}

impl PvTransport for MockTransport {
    fn put(&self, pv: &str, value: i32) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if let Some(message) = state.put_failures.get(pv) {
            return Err(TransportError::Rejected {
                pv: pv.to_string(),
                message: message.clone(),
            });
        }

        state.registers.insert(pv.to_string(), f64::from(value));
        state.journal.push(MockOp::Put {
            pv: pv.to_string(),
            value,
        });

        let reactions = state.reactions.get(pv).cloned().unwrap_or_default();
        for (target, values) in reactions {
            state.scripts.entry(target).or_default().extend(values);
        }
        Ok(())
    }

    fn get(&self, pv: &str) -> Result<f64, TransportError> {
        let mut state = self.state.lock();
        if state.get_failures.contains(pv) {
            return Err(TransportError::Disconnected { pv: pv.to_string() });
        }

        let scripted = state.scripts.get_mut(pv).and_then(VecDeque::pop_front);
        let value = match scripted {
            Some(value) => {
                state.registers.insert(pv.to_string(), value);
                value
            },
            None => state.registers.get(pv).copied().unwrap_or(0.0),
        };

        state.journal.push(MockOp::Get {
            pv: pv.to_string(),
            value,
        });
        Ok(value)
    }
}
