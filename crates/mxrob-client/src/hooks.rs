//! 钩子系统（Hook System）
//!
//! 序列器在每个循环/步骤边界，以及运动监视器的每次状态转换（运动开始、
//! 挂起、恢复、运动完成）时产生一个 [`CycleEvent`]，并同步分发给所有已注册的
//! [`CycleObserver`]。
//!
//! # 使用示例
//!
//! ```rust
//! use mxrob_client::hooks::{CycleObserver, HookManager, TracingObserver};
//! use mxrob_client::recording::EventRecorder;
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! hooks.add_observer(Arc::new(TracingObserver));
//!
//! let (recorder, rx) = EventRecorder::new();
//! hooks.add_observer(Arc::new(recorder) as Arc<dyn CycleObserver>);
//! assert_eq!(hooks.len(), 2);
//! # drop(rx);
//! ```

use crate::types::{CycleStep, MonitorTransition};
use mxrob_pv::LoopIndex;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// 事件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CycleEventKind {
    CycleStarted,
    /// 命令即将下发
    StepStarted,
    /// 步骤完成（运动步骤附带轮询统计）
    StepCompleted {
        polls: u32,
        pauses: u32,
        paused_ms: u64,
        elapsed_ms: u64,
    },
    /// `isMoving` 首次读到 1
    MotionStarted {
        polls: u32,
    },
    /// 操作员请求停止，监视器挂起
    Paused,
    Resumed {
        paused_ms: u64,
    },
    /// `isMoving` 读回 0
    MotionCompleted {
        polls: u32,
    },
    CycleCompleted {
        elapsed_ms: u64,
    },
    CycleFailed {
        reason: String,
    },
}

impl From<MonitorTransition> for CycleEventKind {
    fn from(transition: MonitorTransition) -> Self {
        match transition {
            MonitorTransition::MotionStarted { polls } => CycleEventKind::MotionStarted { polls },
            MonitorTransition::Paused => CycleEventKind::Paused,
            MonitorTransition::Resumed { paused } => CycleEventKind::Resumed {
                paused_ms: paused.as_millis() as u64,
            },
            MonitorTransition::MotionComplete { polls } => {
                CycleEventKind::MotionCompleted { polls }
            },
        }
    }
}

/// 循环事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleEvent {
    /// 墙钟时间戳（Unix 纪元起的微秒）
    pub timestamp_us: u64,
    pub loop_index: LoopIndex,
    /// 循环级事件没有步骤
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<CycleStep>,
    #[serde(flatten)]
    pub kind: CycleEventKind,
}

impl CycleEvent {
    /// 以当前时间创建事件
    pub fn now(loop_index: LoopIndex, step: Option<CycleStep>, kind: CycleEventKind) -> Self {
        let timestamp_us = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        Self {
            timestamp_us,
            loop_index,
            step,
            kind,
        }
    }
}

/// 事件回调 Trait
///
/// 回调在序列器线程上同步执行，必须快速返回；耗时处理请通过 Channel
/// 转交给其他线程（参见 [`EventRecorder`](crate::recording::EventRecorder)）。
pub trait CycleObserver: Send + Sync {
    fn on_event(&self, event: &CycleEvent);
}

/// 钩子管理器
#[derive(Default)]
pub struct HookManager {
    observers: Vec<Arc<dyn CycleObserver>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn CycleObserver>) {
        self.observers.push(observer);
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.observers.clear();
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// 按注册顺序触发所有回调
    pub fn trigger_all(&self, event: &CycleEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// 把事件写入 `tracing`（`debug` 级别，target `mxrob::events`）
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CycleObserver for TracingObserver {
    fn on_event(&self, event: &CycleEvent) {
        debug!(
            target: "mxrob::events",
            timestamp_us = event.timestamp_us,
            loop_index = event.loop_index.get(),
            step = event.step.map(CycleStep::as_str),
            kind = ?event.kind,
            "cycle event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver {
        count: AtomicUsize,
    }

    impl CycleObserver for CountingObserver {
        fn on_event(&self, _event: &CycleEvent) {
            self.count.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn event(kind: CycleEventKind) -> CycleEvent {
        CycleEvent::now(LoopIndex::new(2).unwrap(), Some(CycleStep::Pick), kind)
    }

    #[test]
    fn test_trigger_all() {
        let counter = Arc::new(CountingObserver {
            count: AtomicUsize::new(0),
        });
        let mut hooks = HookManager::new();
        assert!(hooks.is_empty());

        hooks.add_observer(counter.clone());
        hooks.add_observer(Arc::new(TracingObserver));
        hooks.trigger_all(&event(CycleEventKind::StepStarted));
        hooks.trigger_all(&event(CycleEventKind::CycleStarted));
        assert_eq!(counter.count.load(Ordering::Relaxed), 2);

        hooks.clear();
        assert_eq!(hooks.len(), 0);
    }

    #[test]
    fn test_event_json_shape() {
        let event = CycleEvent {
            timestamp_us: 42,
            loop_index: LoopIndex::new(3).unwrap(),
            step: Some(CycleStep::Place),
            kind: CycleEventKind::StepCompleted {
                polls: 5,
                pauses: 1,
                paused_ms: 300,
                elapsed_ms: 1800,
            },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "step_completed");
        assert_eq!(value["loop_index"], 3);
        assert_eq!(value["step"], "place");
        assert_eq!(value["polls"], 5);

        let event = CycleEvent {
            step: None,
            kind: CycleEventKind::CycleStarted,
            ..event
        };
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("step").is_none());
        assert_eq!(value["event"], "cycle_started");
    }

    #[test]
    fn test_monitor_transition_kinds() {
        let kind = CycleEventKind::from(MonitorTransition::Resumed {
            paused: std::time::Duration::from_millis(1500),
        });
        assert_eq!(kind, CycleEventKind::Resumed { paused_ms: 1500 });

        let value = serde_json::to_value(&event(CycleEventKind::Paused)).unwrap();
        assert_eq!(value["event"], "paused");
        assert_eq!(value["step"], "pick");

        let value = serde_json::to_value(&event(CycleEventKind::from(
            MonitorTransition::MotionStarted { polls: 3 },
        )))
        .unwrap();
        assert_eq!(value["event"], "motion_started");
        assert_eq!(value["polls"], 3);
    }

    #[test]
    fn test_timestamp_is_wall_clock() {
        let event = event(CycleEventKind::CycleStarted);
        // 2020-01-01 之后
        assert!(event.timestamp_us > 1_577_836_800_000_000);
    }
}
