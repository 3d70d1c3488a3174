//! 模拟 IOC
//!
//! 在后台线程中模拟机械臂 IOC 的可观察行为，用于无硬件调试和端到端测试：
//!
//! - 运动命令（`PickLoop`/`PlaceLoop`/`RetrieveLoop`）进入运动栈，
//!   经过 `start_latency` 后 `CheckMoving` 置 1，再经过 `move_duration` 置 0
//! - `StopMove = 1` 冻结当前运动（计时暂停），置 0 后继续
//! - `DeleteMove = 1` 清空运动栈，`CheckMoving` 立即置 0
//! - `RestartMove = 1` 解除停止请求
//! - 断电时拒绝运动命令；运动进行中拒绝夹爪命令（真实控制器在运动中
//!   收到夹爪命令会阻塞 IOC 与机械臂的通信）

use crate::{PvTransport, TransportError};
use mxrob_pv::{MotionKind, PvName, PvTable, PvWrite};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// 模拟 IOC 配置
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// PV 前缀
    pub prefix: String,
    /// 命令回执后到 `CheckMoving` 置 1 的延迟
    pub start_latency: Duration,
    /// 运动持续时间
    pub move_duration: Duration,
    /// 模拟线程步进周期
    pub tick: Duration,
    /// 断电时是否拒绝运动命令
    pub require_power: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            prefix: mxrob_pv::DEFAULT_PREFIX.to_string(),
            start_latency: Duration::from_millis(150),
            move_duration: Duration::from_millis(1500),
            tick: Duration::from_millis(10),
            require_power: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    /// 已受理，尚未开始运动
    Latency(Duration),
    /// 运动中
    Moving(Duration),
}

#[derive(Debug, Clone, Copy)]
struct ActiveMove {
    kind: MotionKind,
    target: i32,
    phase: Phase,
}

#[derive(Debug, Default)]
struct SimState {
    registers: HashMap<PvName, f64>,
    pending: VecDeque<(MotionKind, i32)>,
    active: Option<ActiveMove>,
    history: Vec<PvWrite>,
}

impl SimState {
    fn register(&self, pv: PvName) -> f64 {
        self.registers.get(&pv).copied().unwrap_or(0.0)
    }

    fn flag(&self, pv: PvName) -> bool {
        self.register(pv) == 1.0
    }

    fn busy(&self) -> bool {
        self.active.is_some() || !self.pending.is_empty()
    }

    /// 推进模拟时间
    fn advance(&mut self, dt: Duration, config: &SimConfig) {
        if self.flag(PvName::StopMove) {
            return;
        }

        if self.active.is_none() {
            if let Some((kind, target)) = self.pending.pop_front() {
                self.active = Some(ActiveMove {
                    kind,
                    target,
                    phase: Phase::Latency(config.start_latency),
                });
            }
        }

        let Some(mut active) = self.active else {
            return;
        };

        match active.phase {
            Phase::Latency(remaining) => {
                let remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    debug!(kind = %active.kind, target = active.target, "sim: motion started");
                    self.registers.insert(PvName::CheckMoving, 1.0);
                    active.phase = Phase::Moving(config.move_duration);
                } else {
                    active.phase = Phase::Latency(remaining);
                }
                self.active = Some(active);
            },
            Phase::Moving(remaining) => {
                let remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    debug!(kind = %active.kind, target = active.target, "sim: motion finished");
                    self.registers.insert(PvName::CheckMoving, 0.0);
                    self.active = None;
                } else {
                    active.phase = Phase::Moving(remaining);
                    self.active = Some(active);
                }
            },
        }
    }

    fn apply_put(&mut self, pv: PvName, value: i32, config: &SimConfig) -> Result<(), String> {
        match pv {
            PvName::PickLoop | PvName::PlaceLoop | PvName::RetrieveLoop => {
                if config.require_power && !self.flag(PvName::Power) {
                    return Err("arm power is off".to_string());
                }
                if let Some(kind) = MotionKind::from_pv(pv) {
                    self.pending.push_back((kind, value));
                }
            },
            PvName::Gripper => {
                if self.busy() || self.flag(PvName::CheckMoving) {
                    return Err("gripper command while arm is moving".to_string());
                }
            },
            PvName::DeleteMove if value == 1 => {
                self.pending.clear();
                self.active = None;
                self.registers.insert(PvName::CheckMoving, 0.0);
                // 瞬时触发型记录，处理后复位
                self.history.push(PvWrite::new(pv, value));
                self.registers.insert(pv, 0.0);
                return Ok(());
            },
            PvName::RestartMove if value == 1 => {
                self.registers.insert(PvName::StopMove, 0.0);
                self.history.push(PvWrite::new(pv, value));
                self.registers.insert(pv, 0.0);
                return Ok(());
            },
            _ => {},
        }

        self.registers.insert(pv, f64::from(value));
        self.history.push(PvWrite::new(pv, value));
        Ok(())
    }
}

/// 进程内模拟 IOC
///
/// 持有一个后台步进线程；`Drop` 时自动停止线程。
pub struct SimulatedIoc {
    table: PvTable,
    config: SimConfig,
    state: Arc<Mutex<SimState>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SimulatedIoc {
    /// 启动模拟 IOC
    ///
    /// # 错误
    ///
    /// - `TransportError::Io`: 无法创建后台线程
    pub fn start(config: SimConfig) -> Result<Self, TransportError> {
        let table = PvTable::new(config.prefix.clone());
        let state = Arc::new(Mutex::new(SimState::default()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = {
            let state = state.clone();
            let shutdown = shutdown.clone();
            let config = config.clone();
            thread::Builder::new()
                .name("mxrob-sim-ioc".to_string())
                .spawn(move || Self::step_loop(state, config, shutdown))?
        };

        Ok(SimulatedIoc {
            table,
            config,
            state,
            shutdown,
            handle: Some(handle),
        })
    }

    fn step_loop(state: Arc<Mutex<SimState>>, config: SimConfig, shutdown: Arc<AtomicBool>) {
        let mut last = Instant::now();
        while !shutdown.load(Ordering::Relaxed) {
            thread::sleep(config.tick);
            let now = Instant::now();
            state.lock().advance(now - last, &config);
            last = now;
        }
    }

    /// 名称表
    pub fn table(&self) -> &PvTable {
        &self.table
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// 已受理的写入记录（按时间顺序）
    pub fn history(&self) -> Vec<PvWrite> {
        self.state.lock().history.clone()
    }

    /// 按记录直接读取寄存器（不经过名称解析）
    pub fn register(&self, pv: PvName) -> f64 {
        self.state.lock().register(pv)
    }

    /// 是否有未完成的运动
    pub fn is_busy(&self) -> bool {
        self.state.lock().busy()
    }

    /// 停止后台线程
    pub fn shutdown(mut self) {
        self.stop_thread();
    }

    fn stop_thread(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn resolve(&self, pv: &str) -> Result<PvName, TransportError> {
        self.table
            .lookup(pv)
            .ok_or_else(|| TransportError::Disconnected { pv: pv.to_string() })
    }
}

impl Drop for SimulatedIoc {
    fn drop(&mut self) {
        self.stop_thread();
    }
}

impl PvTransport for SimulatedIoc {
    fn put(&self, pv: &str, value: i32) -> Result<(), TransportError> {
        let name = self.resolve(pv)?;
        trace!(pv, value, "sim put");
        self.state
            .lock()
            .apply_put(name, value, &self.config)
            .map_err(|message| TransportError::Rejected {
                pv: pv.to_string(),
                message,
            })
    }

    fn get(&self, pv: &str) -> Result<f64, TransportError> {
        let name = self.resolve(pv)?;
        Ok(self.state.lock().register(name))
    }
}
