//! 取消令牌
//!
//! 跨线程共享的原子标志。CLI 把 Ctrl-C 接到 [`CancelToken::cancel`]，
//! 监视器和序列器在每次轮询、每次下发命令前检查它。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// 操作已被取消
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Operation cancelled")]
pub struct Cancelled;

/// 取消令牌（可克隆，所有克隆共享同一标志）
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// 已取消时返回 `Err(Cancelled)`
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// 可中断的睡眠
    ///
    /// 按 `slice` 分段睡眠，每段之间检查一次标志。
    ///
    /// # 错误
    ///
    /// - `Cancelled`: 睡眠开始前或期间收到取消请求
    pub fn sleep(&self, total: Duration, slice: Duration) -> Result<(), Cancelled> {
        let deadline = Instant::now() + total;
        let slice = slice.max(Duration::from_millis(1));
        loop {
            self.check()?;
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }
            std::thread::sleep(slice.min(remaining));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(token.check().is_ok());

        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(Cancelled));
    }

    #[test]
    fn test_sleep_completes() {
        let token = CancelToken::new();
        let start = Instant::now();
        token
            .sleep(Duration::from_millis(30), Duration::from_millis(5))
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_sleep_interrupted() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let start = Instant::now();
        let result = token.sleep(Duration::from_secs(5), Duration::from_millis(5));
        handle.join().unwrap();

        assert_eq!(result, Err(Cancelled));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_zero_sleep_still_checks() {
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(token.sleep(Duration::ZERO, Duration::ZERO), Err(Cancelled));
    }
}
