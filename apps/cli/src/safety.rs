//! 安全检查模块
//!
//! 上电前的人工确认和 Ctrl-C 处理

use anyhow::{Context, Result, anyhow};
use mxrob_sdk::CancelToken;

/// 上电前确认
///
/// `assume_yes` 为 true 时（`--yes`）跳过提示。默认答案为 No。
pub fn confirm_power_on(prefix: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    println!("⚠️  即将为机械臂上电: {prefix}");
    println!("  请确认杜瓦盖已打开、工作区内无人员");

    inquire::Confirm::new("确定要继续吗？")
        .with_default(false)
        .prompt()
        .map_err(|e| anyhow!("User interaction failed: {e}"))
}

/// 把 Ctrl-C 接到取消令牌
///
/// 序列器会在下一次轮询时中止，不会向机械臂发送任何额外命令。
pub fn install_interrupt_handler(cancel: &CancelToken) -> Result<()> {
    let token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\n🛑 收到中断信号，将在当前轮询结束后中止（机械臂状态保持不变）");
        token.cancel();
    })
    .context("Failed to install Ctrl-C handler")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assume_yes_skips_prompt() {
        assert!(confirm_power_on("MXROB:Staubli2", true).unwrap());
    }
}
