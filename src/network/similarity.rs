//! 用户间长期内容相似性
//!
//! 与对话推断互补的"静态"信号：不看时间，只看两个用户各自全部发言的
//! 词集合 Jaccard 重叠。用户对较多时可选并行计算；并行路径只是性能
//! 优化，任何失败都降级回顺序路径，绝不影响结果。

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};

use crate::types::Message;
use crate::utils::tokenize;

use super::{canonical_pair, Pair};

/// 并行计算的用户对数量门槛
const PARALLEL_PAIR_THRESHOLD: usize = 100;
/// 并行工作线程上限
const MAX_WORKERS: usize = 4;
/// 参与相似度计算的最小合格消息数
const MIN_QUALIFYING_MESSAGES: usize = 2;
/// 合格消息的最小内容长度（字符）
const MIN_CONTENT_CHARS: usize = 2;

/// 分析用户间的长期内容相似性
///
/// 返回 `{规范化用户对: Jaccard 相似度}`，低于阈值的对被丢弃。
pub(crate) fn analyze_content_similarity(
    messages: &[Message],
    similarity_threshold: f64,
    enable_parallel: bool,
) -> BTreeMap<Pair, f64> {
    // 收集每个用户的合格消息内容
    let mut user_contents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for msg in messages {
        if !msg.participates() {
            continue;
        }
        let content = msg.content.trim();
        if msg.qq.is_empty() || content.is_empty() || content.chars().count() <= MIN_CONTENT_CHARS {
            continue;
        }
        user_contents.entry(&msg.qq).or_default().push(content);
    }

    // 每个用户的词集合只算一次，之后的并行任务不共享可变状态
    let user_tokens: BTreeMap<&str, HashSet<String>> = user_contents
        .iter()
        .map(|(qq, contents)| {
            let mut tokens = HashSet::new();
            for content in contents {
                tokens.extend(tokenize(content));
            }
            (*qq, tokens)
        })
        .collect();

    // 用户对组合（键已排序，对本身即规范化顺序）
    let users: Vec<&str> = user_contents.keys().copied().collect();
    let mut user_pairs = Vec::new();
    for (i, a) in users.iter().enumerate() {
        for b in &users[i + 1..] {
            // 两侧都至少要有 2 条合格消息
            if user_contents[a].len() >= MIN_QUALIFYING_MESSAGES
                && user_contents[b].len() >= MIN_QUALIFYING_MESSAGES
            {
                user_pairs.push((*a, *b));
            }
        }
    }

    debug!(
        "content similarity: {} users, {} candidate pairs",
        users.len(),
        user_pairs.len()
    );

    let scored: Vec<((&str, &str), f64)> =
        if enable_parallel && user_pairs.len() > PARALLEL_PAIR_THRESHOLD {
            compute_parallel(&user_pairs, &user_tokens)
        } else {
            compute_sequential(&user_pairs, &user_tokens)
        };

    scored
        .into_iter()
        .filter(|(_, similarity)| *similarity > similarity_threshold)
        .map(|((a, b), similarity)| (canonical_pair(a, b), similarity))
        .collect()
}

fn compute_sequential<'a>(
    user_pairs: &[(&'a str, &'a str)],
    user_tokens: &BTreeMap<&'a str, HashSet<String>>,
) -> Vec<((&'a str, &'a str), f64)> {
    user_pairs
        .iter()
        .map(|&(a, b)| ((a, b), jaccard(&user_tokens[a], &user_tokens[b])))
        .collect()
}

/// 并行计算相似性；线程池建不起来就降级回顺序计算
fn compute_parallel<'a>(
    user_pairs: &[(&'a str, &'a str)],
    user_tokens: &BTreeMap<&'a str, HashSet<String>>,
) -> Vec<((&'a str, &'a str), f64)> {
    use rayon::prelude::*;

    let workers = num_cpus::get().saturating_sub(1).clamp(1, MAX_WORKERS);
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool,
        Err(e) => {
            warn!("parallel similarity failed ({e}), falling back to sequential");
            return compute_sequential(user_pairs, user_tokens);
        }
    };

    pool.install(|| {
        user_pairs
            .par_iter()
            .with_min_len(10)
            .map(|&(a, b)| ((a, b), jaccard(&user_tokens[a], &user_tokens[b])))
            .collect()
    })
}

/// Jaccard 相似度：|交集| / |并集|
fn jaccard(words1: &HashSet<String>, words2: &HashSet<String>) -> f64 {
    if words1.is_empty() || words2.is_empty() {
        return 0.0;
    }
    let intersection = words1.intersection(words2).count() as f64;
    let union = words1.union(words2).count() as f64;
    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}
