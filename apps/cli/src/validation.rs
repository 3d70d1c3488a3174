//! 输入验证模块
//!
//! clap 的自定义解析器

use mxrob_sdk::LoopIndex;

/// 解析样品位索引（正整数）
pub fn parse_loop_index(s: &str) -> Result<LoopIndex, String> {
    let value: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a valid slot number"))?;
    LoopIndex::new(value).map_err(|_| "slot 0 is reserved for the beam position".to_string())
}
