//! 归一化消息数据模型
//!
//! 引擎的唯一输入。字段名与导入层产出的 JSON 保持一致（`qq`、`time`、
//! `timestamp_ms`、`reply_to_qq` 等），便于 Web 边界直接反序列化。
//! 导入/去重/过滤由上游协作方负责，这里不做任何归一化。

use serde::{Deserialize, Serialize};

fn default_message_type() -> String {
    "unknown".to_string()
}

/// 一条归一化后的聊天消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// 发送者唯一标识
    pub qq: String,

    /// 发送者展示名（群昵称）
    #[serde(default)]
    pub sender: String,

    /// 时间字符串（`YYYY-MM-DD HH:MM:SS` 或 ISO 格式；旧数据可能缺失）
    #[serde(default)]
    pub time: String,

    /// epoch 毫秒时间戳（结构化导入时存在，优先于 `time`）
    #[serde(default)]
    pub timestamp_ms: Option<i64>,

    /// 消息文本内容
    #[serde(default)]
    pub content: String,

    /// @提及的目标 participantId 列表
    #[serde(default)]
    pub mentions: Vec<String>,

    /// 回复目标的发送者标识（若能从回复元素解析到）
    #[serde(default)]
    pub reply_to_qq: Option<String>,

    /// 消息类型：text / reply / system / recalled / unknown 等
    #[serde(default = "default_message_type")]
    pub message_type: String,

    /// 系统灰条消息（入群、撤回提示等）
    #[serde(default)]
    pub is_system: bool,

    /// 已撤回消息
    #[serde(default)]
    pub is_recalled: bool,
}

impl Message {
    /// 构造一条普通文本消息（测试与内嵌调用方使用）
    pub fn text(qq: &str, sender: &str, time: &str, content: &str) -> Self {
        Self {
            qq: qq.to_string(),
            sender: sender.to_string(),
            time: time.to_string(),
            timestamp_ms: None,
            content: content.to_string(),
            mentions: Vec::new(),
            reply_to_qq: None,
            message_type: "text".to_string(),
            is_system: false,
            is_recalled: false,
        }
    }

    /// 是否参与互动分析（系统/撤回事件不参与互动边）
    pub fn participates(&self) -> bool {
        !self.is_system && !self.is_recalled
    }
}
