//! 异步事件录制
//!
//! [`EventRecorder`] 把事件投递到有界 Channel，由其他线程消费（写 JSON
//! 行、转发到监控系统等）。队列满时丢弃事件而不是阻塞序列器，并累计
//! 丢弃计数。

use crate::hooks::{CycleEvent, CycleObserver};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 默认队列容量
///
/// 每个循环约 12 个事件，足够缓存数百个循环。
pub const DEFAULT_CAPACITY: usize = 4096;

/// 异步事件录制钩子
pub struct EventRecorder {
    tx: Sender<CycleEvent>,
    dropped_events: Arc<AtomicU64>,
    event_counter: Arc<AtomicU64>,
}

impl EventRecorder {
    /// 使用默认容量创建
    ///
    /// # 返回
    ///
    /// - `(recorder, rx)`: 钩子实例和接收端
    #[must_use]
    pub fn new() -> (Self, Receiver<CycleEvent>) {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, Receiver<CycleEvent>) {
        let (tx, rx) = bounded(capacity);
        let recorder = Self {
            tx,
            dropped_events: Arc::new(AtomicU64::new(0)),
            event_counter: Arc::new(AtomicU64::new(0)),
        };
        (recorder, rx)
    }

    /// 丢弃计数器（队列满或接收端已关闭）
    pub fn dropped_events(&self) -> &Arc<AtomicU64> {
        &self.dropped_events
    }

    /// 成功投递计数器
    pub fn event_counter(&self) -> &Arc<AtomicU64> {
        &self.event_counter
    }
}

impl CycleObserver for EventRecorder {
    fn on_event(&self, event: &CycleEvent) {
        match self.tx.try_send(event.clone()) {
            Ok(()) => {
                self.event_counter.fetch_add(1, Ordering::Relaxed);
            },
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::CycleEventKind;
    use mxrob_pv::LoopIndex;

    fn started() -> CycleEvent {
        CycleEvent::now(LoopIndex::new(1).unwrap(), None, CycleEventKind::CycleStarted)
    }

    #[test]
    fn test_records_events() {
        let (recorder, rx) = EventRecorder::new();
        recorder.on_event(&started());
        recorder.on_event(&started());

        assert_eq!(recorder.event_counter().load(Ordering::Relaxed), 2);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn test_drops_when_full() {
        let (recorder, rx) = EventRecorder::with_capacity(2);
        for _ in 0..5 {
            recorder.on_event(&started());
        }

        assert_eq!(recorder.event_counter().load(Ordering::Relaxed), 2);
        assert_eq!(recorder.dropped_events().load(Ordering::Relaxed), 3);
        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn test_drops_when_receiver_gone() {
        let (recorder, rx) = EventRecorder::new();
        drop(rx);
        recorder.on_event(&started());
        assert_eq!(recorder.dropped_events().load(Ordering::Relaxed), 1);
    }
}
