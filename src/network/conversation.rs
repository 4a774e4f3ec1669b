//! 时间窗口对话推断
//!
//! 在按时间排序的消息流上前向扫描，为"谁在和谁说话"打分。没有回复
//! 元数据的消息靠时间邻近度、@提及、词面相关性的组合启发式判定。

use std::collections::{BTreeMap, HashSet};

use crate::types::Message;
use crate::utils::{message_datetime, strip_punctuation};

use super::{canonical_pair, Pair};

/// 单条消息最多向前看 50 条候选
const MAX_LOOKAHEAD: usize = 50;

// 对话分数的经验常量（来自线上调参，保持原值，不要重新推导）
const PROXIMITY_5_MIN: f64 = 0.6;
const PROXIMITY_15_MIN: f64 = 0.4;
const PROXIMITY_30_MIN: f64 = 0.2;
const PROXIMITY_IN_WINDOW: f64 = 0.1;
const MENTION_EXACT: f64 = 0.55;
const MENTION_LEGACY: f64 = 0.35;
const REPLY_BONUS: f64 = 0.6;
const RELATED_BONUS: f64 = 0.2;
const BASE_BONUS: f64 = 0.1;
const RELATED_OVERLAP_THRESHOLD: f64 = 0.2;

/// 从时间序列中提取对话关系
///
/// 返回 `{规范化用户对: 累计对话分数}`。分数按对累加为浮点值而不是简单
/// 计数，反复密集的交流平滑地积累权重而不会饱和。
pub(crate) fn extract_conversations(
    messages: &[Message],
    window_minutes: f64,
) -> BTreeMap<Pair, f64> {
    let mut conversations: BTreeMap<Pair, f64> = BTreeMap::new();

    for (i, msg1) in messages.iter().enumerate() {
        // 系统/撤回事件不参与互动边
        if !msg1.participates() || msg1.qq.is_empty() {
            continue;
        }
        let Some(time1) = message_datetime(msg1) else {
            continue;
        };

        // 在时间窗口内查找可能的对话伙伴
        let end = (i + 1 + MAX_LOOKAHEAD).min(messages.len());
        for msg2 in &messages[i + 1..end] {
            if !msg2.participates() {
                continue;
            }
            if msg2.qq.is_empty() || msg2.qq == msg1.qq {
                continue;
            }
            let Some(time2) = message_datetime(msg2) else {
                continue;
            };

            let time_diff = (time2 - time1).num_milliseconds() as f64 / 60_000.0;

            // 消息已按时间排序：一旦超出窗口，后面的候选也不可能命中
            if time_diff > window_minutes {
                break;
            }

            let score = conversation_score(msg1, msg2, time_diff, window_minutes);
            if score > 0.0 {
                *conversations
                    .entry(canonical_pair(&msg1.qq, &msg2.qq))
                    .or_insert(0.0) += score;
            }
        }
    }

    conversations
}

/// 计算两条消息构成一次对话的可能性分数（0-1）
fn conversation_score(msg1: &Message, msg2: &Message, time_diff: f64, window_minutes: f64) -> f64 {
    let mut score = 0.0;

    // 1. 时间邻近度
    if time_diff <= 5.0 {
        score += PROXIMITY_5_MIN; // 5分钟内回复，很可能是对话
    } else if time_diff <= 15.0 {
        score += PROXIMITY_15_MIN;
    } else if time_diff <= 30.0 {
        score += PROXIMITY_30_MIN;
    } else if time_diff <= window_minutes {
        score += PROXIMITY_IN_WINDOW; // 在窗口内但时间较长
    }

    // 2. @提及加分：mentions 列表里只对精确 id 加分，旧格式 "@id" 子串兜底
    if msg1.mentions.iter().any(|m| m == &msg2.qq) {
        score += MENTION_EXACT;
    } else if msg2.mentions.iter().any(|m| m == &msg1.qq) {
        score += MENTION_EXACT;
    } else if msg1.content.contains(&format!("@{}", msg2.qq))
        || msg2.content.contains(&format!("@{}", msg1.qq))
    {
        score += MENTION_LEGACY;
    }

    // 2.5 reply 加分（若能解析到回复对象），与提及加分叠加
    if msg2.reply_to_qq.as_deref() == Some(msg1.qq.as_str())
        || msg1.reply_to_qq.as_deref() == Some(msg2.qq.as_str())
    {
        score += REPLY_BONUS;
    }

    // 3. 内容相关性（简单词重叠检查）
    if messages_related(&msg1.content, &msg2.content) {
        score += RELATED_BONUS;
    }

    // 4. 基础互动分数：在窗口内就有
    if time_diff <= window_minutes {
        score += BASE_BONUS;
    }

    score.min(1.0)
}

/// 简单检查两条消息是否相关：去标点后的词集合 Jaccard 重叠 > 0.2
fn messages_related(content1: &str, content2: &str) -> bool {
    if content1.is_empty() || content2.is_empty() {
        return false;
    }

    let clean1 = strip_punctuation(content1);
    let clean2 = strip_punctuation(content2);

    let words1: HashSet<&str> = clean1.split_whitespace().collect();
    let words2: HashSet<&str> = clean2.split_whitespace().collect();

    if words1.is_empty() || words2.is_empty() {
        return false;
    }

    let overlap = words1.intersection(&words2).count() as f64;
    let union = words1.union(&words2).count() as f64;

    overlap / union > RELATED_OVERLAP_THRESHOLD
}
