//! 时间解析与分词工具

use chrono::{DateTime, NaiveDateTime};

use crate::types::Message;

/// 解析时间戳，兼容多种格式：
/// - 标准格式: `2025-05-10 00:30:00`
/// - ISO 格式: `2025-05-10T00:30:00`
/// - 单数字小时: `2025-05-10 0:30:00`（chrono 的数字解析天然接受）
///
/// 解析失败返回 `None`，调用方把这类消息视为无时间戳（不参与时间窗口
/// 比较，但不会中断整次分析）。
pub fn parse_timestamp(time_str: &str) -> Option<NaiveDateTime> {
    let time_str = time_str.trim();
    if time_str.is_empty() {
        return None;
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(time_str, fmt).ok())
}

/// 取消息的可比较时间：优先 `time` 字符串，缺失时回退到 `timestamp_ms`
pub fn message_datetime(msg: &Message) -> Option<NaiveDateTime> {
    if let Some(dt) = parse_timestamp(&msg.time) {
        return Some(dt);
    }
    match msg.timestamp_ms {
        Some(ms) if ms > 0 => DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc()),
        _ => None,
    }
}

/// 移除标点符号和表情，保留文字、数字与空白
pub fn strip_punctuation(text: &str) -> String {
    // 直接删除而不是替换为空格，与相邻字符合并（"don't" -> "dont"）
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}

/// 简单分词：去标点、按空白切分、丢弃单字符词
pub fn tokenize(text: &str) -> Vec<String> {
    strip_punctuation(text)
        .split_whitespace()
        .filter(|word| word.chars().count() > 1)
        .map(|word| word.to_string())
        .collect()
}
