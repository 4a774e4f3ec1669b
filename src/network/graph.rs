//! 互动权重合并与可视化图构建
//!
//! 把对话信号与相似性信号线性合并为每对用户唯一的无向边权重，然后按
//! 配置上限裁剪节点/边，保证前端渲染可行。裁剪永远基于合并后的最终
//! 权重，不使用任何中间信号。

use std::collections::BTreeMap;

use log::debug;

use crate::config::NetworkConfig;

use super::{Edge, Node, Pair};

/// 对话信号权重占比
const CONVERSATION_WEIGHT: f64 = 0.7;
/// 内容相似性信号权重占比
const SIMILARITY_WEIGHT: f64 = 0.3;

/// 构图结果（裁剪前后的数量都保留，供调用方展示丢弃了多少）
#[derive(Debug, Default)]
pub(crate) struct GraphParts {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub interaction_matrix: BTreeMap<String, f64>,
    pub original_nodes_count: usize,
    pub original_edges_count: usize,
}

/// 综合计算互动权重：0.7×对话 + 0.3×相似性，丢弃低于下限的弱关系
pub(crate) fn combine_interaction_weights(
    conversations: &BTreeMap<Pair, f64>,
    similarities: &BTreeMap<Pair, f64>,
    min_interactions: f64,
) -> BTreeMap<Pair, f64> {
    let mut weights: BTreeMap<Pair, f64> = BTreeMap::new();

    for (pair, conv_weight) in conversations {
        *weights.entry(pair.clone()).or_insert(0.0) += conv_weight * CONVERSATION_WEIGHT;
    }
    for (pair, sim_weight) in similarities {
        *weights.entry(pair.clone()).or_insert(0.0) += sim_weight * SIMILARITY_WEIGHT;
    }

    weights.retain(|_, weight| *weight >= min_interactions);
    weights
}

/// 构建最终的网络图
///
/// 依次执行：记录原始数量 → 过滤弱边 → 节点超限时保留度数最高的节点 →
/// 边超限时保留权重最高的边并重算节点集。
pub(crate) fn construct_graph(
    interaction_weights: BTreeMap<Pair, f64>,
    config: &NetworkConfig,
    names: &BTreeMap<String, String>,
) -> GraphParts {
    let mut parts = GraphParts::default();

    // 原始数量（裁剪透明性）
    let mut all_users: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
    for (a, b) in interaction_weights.keys() {
        all_users.insert(a);
        all_users.insert(b);
    }
    parts.original_nodes_count = all_users.len();
    parts.original_edges_count = interaction_weights.len();

    // 第一步：过滤边权重（移除过弱的关系）
    let mut filtered: BTreeMap<Pair, f64> = interaction_weights
        .into_iter()
        .filter(|(_, weight)| *weight >= config.min_edge_weight)
        .collect();

    let mut filtered_users: std::collections::BTreeSet<String> = filtered
        .keys()
        .flat_map(|(a, b)| [a.clone(), b.clone()])
        .collect();

    // 第二步：节点过多时只保留度数最高的节点（按未加权度数）
    if filtered_users.len() > config.max_nodes_for_viz {
        let mut node_degrees: BTreeMap<&str, usize> = BTreeMap::new();
        for (a, b) in filtered.keys() {
            *node_degrees.entry(a).or_insert(0) += 1;
            *node_degrees.entry(b).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = node_degrees.into_iter().collect();
        // 度数降序；同度数按 id 升序保证确定性
        ranked.sort_by(|(a, da), (b, db)| db.cmp(da).then(a.cmp(b)));

        let top_users: std::collections::BTreeSet<String> = ranked
            .into_iter()
            .take(config.max_nodes_for_viz)
            .map(|(qq, _)| qq.to_string())
            .collect();

        filtered.retain(|(a, b), _| top_users.contains(a) && top_users.contains(b));
        filtered_users = top_users;
    }

    // 第三步：边过多时按权重保留，并从幸存的边重算节点集
    // （失去所有边的节点随之被丢弃，即使它在上一步幸存）
    if filtered.len() > config.max_edges_for_viz {
        let mut ranked: Vec<(Pair, f64)> = filtered.into_iter().collect();
        ranked.sort_by(|(pa, wa), (pb, wb)| {
            wb.partial_cmp(wa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| pa.cmp(pb))
        });
        ranked.truncate(config.max_edges_for_viz);
        filtered = ranked.into_iter().collect();

        filtered_users = filtered
            .keys()
            .flat_map(|(a, b)| [a.clone(), b.clone()])
            .collect();
    }

    debug!(
        "graph pruning: {}/{} nodes, {}/{} edges kept",
        filtered_users.len(),
        parts.original_nodes_count,
        filtered.len(),
        parts.original_edges_count
    );

    let display = |qq: &str| -> String {
        names
            .get(qq)
            .cloned()
            .unwrap_or_else(|| qq.to_string())
    };

    // 节点列表（value 先占位，中心度算完后更新为节点大小）
    parts.nodes = filtered_users
        .iter()
        .map(|qq| {
            let label = display(qq);
            Node {
                title: format!("{label} ({qq})"),
                id: qq.clone(),
                label,
                value: 1.0,
            }
        })
        .collect();

    // 边列表（含双端昵称与悬停提示）
    parts.edges = filtered
        .iter()
        .map(|((a, b), weight)| {
            let from_name = display(a);
            let to_name = display(b);
            Edge {
                title: format!("{from_name} ↔ {to_name} (强度: {weight:.2})"),
                from: a.clone(),
                to: b.clone(),
                from_name,
                to_name,
                value: *weight,
            }
        })
        .collect();

    parts.interaction_matrix = filtered
        .into_iter()
        .map(|((a, b), weight)| (format!("{a}_{b}"), weight))
        .collect();

    parts
}
