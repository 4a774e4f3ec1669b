//! 社区检测 - 标签传播算法
//!
//! 不预设社区数量：每个节点初始持有唯一标签，每轮按随机顺序访问节点，
//! 采纳邻居中加权频率最高的标签（边权重作为计票增量），同分随机打破。
//! 一整轮没有任何变化即收敛。随机源由调用方注入，种子化后结果可复现。

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{Edge, MostActivePair, Node};

/// 标签传播最大轮数
const MAX_ITERATIONS: usize = 100;

/// 标签传播社区划分
///
/// 返回的每个社区是排序后的节点 id 列表；单人社区代表孤立节点而非
/// 社交圈，被排除在结果之外。
pub(crate) fn detect_communities(
    nodes: &[Node],
    edges: &[Edge],
    rng: &mut StdRng,
) -> Vec<Vec<String>> {
    if edges.is_empty() || nodes.is_empty() {
        return Vec::new();
    }

    let n = nodes.len();
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for edge in edges {
        let (Some(&u), Some(&v)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
        else {
            continue;
        };
        adjacency[u].push((v, edge.value));
        adjacency[v].push((u, edge.value));
    }

    // 初始化：每个节点持有自己的标签
    let mut labels: Vec<usize> = (0..n).collect();
    let mut visit_order: Vec<usize> = (0..n).collect();

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        visit_order.shuffle(rng);

        for &node in &visit_order {
            if adjacency[node].is_empty() {
                continue;
            }

            // 统计邻居标签的加权频率（BTreeMap 保证同分标签枚举顺序稳定）
            let mut label_weights: BTreeMap<usize, f64> = BTreeMap::new();
            for &(neighbor, weight) in &adjacency[node] {
                *label_weights.entry(labels[neighbor]).or_insert(0.0) += weight;
            }

            let max_weight = label_weights.values().copied().fold(f64::MIN, f64::max);
            let best_labels: Vec<usize> = label_weights
                .iter()
                .filter(|(_, w)| **w == max_weight)
                .map(|(label, _)| *label)
                .collect();
            let new_label = best_labels[rng.gen_range(0..best_labels.len())];

            if labels[node] != new_label {
                labels[node] = new_label;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    // 按最终标签分组，只保留多于 1 人的社区
    let mut members: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (node, &label) in labels.iter().enumerate() {
        members.entry(label).or_default().push(nodes[node].id.clone());
    }

    let mut communities: Vec<Vec<String>> = members
        .into_values()
        .filter(|group| group.len() > 1)
        .map(|mut group| {
            group.sort();
            group
        })
        .collect();
    communities.sort();
    communities
}

/// 最活跃互动对：裁剪后权重最大的那条边
pub(crate) fn most_active_pair(
    edges: &[Edge],
    names: &BTreeMap<String, String>,
) -> Option<MostActivePair> {
    // 同权重时保留先出现的边，输出保持确定性
    let mut best: Option<&Edge> = None;
    for edge in edges {
        if best.map_or(true, |b| edge.value > b.value) {
            best = Some(edge);
        }
    }
    let best = best?;

    let display = |qq: &str| names.get(qq).cloned().unwrap_or_else(|| qq.to_string());
    Some(MostActivePair {
        pair: [best.from.clone(), best.to.clone()],
        name1: display(&best.from),
        name2: display(&best.to),
        weight: best.value,
    })
}
