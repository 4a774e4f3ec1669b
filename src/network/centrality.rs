//! 中心度指标
//!
//! 在裁剪后的图上计算三种独立的中心度（度/介数/接近），并给出综合
//! 评分最高的"最受欢迎用户"。介数与接近都按无权跳数最短路计算，边
//! 权重不作为距离使用；这是刻意保留的既有行为。
//!
//! Brandes 算法与逐点 BFS 都是 O(n·m)，所以裁剪必须在中心度之前执行。

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::{Edge, MostPopularUser, Node};

// 综合评分 = 0.5*度中心度 + 0.3*介数中心度 + 0.2*接近中心度
const POPULARITY_DEGREE: f64 = 0.5;
const POPULARITY_BETWEENNESS: f64 = 0.3;
const POPULARITY_CLOSENESS: f64 = 0.2;

/// 节点可视化大小下限，保证低度数节点仍然可见
const NODE_SIZE_FLOOR: f64 = 0.1;

#[derive(Debug, Default)]
pub(crate) struct CentralityReport {
    pub degree: BTreeMap<String, f64>,
    pub betweenness: BTreeMap<String, f64>,
    pub closeness: BTreeMap<String, f64>,
    pub most_popular: Option<MostPopularUser>,
}

/// 计算三种中心度并更新节点大小
pub(crate) fn compute_centrality(
    nodes: &mut [Node],
    edges: &[Edge],
    names: &BTreeMap<String, String>,
) -> CentralityReport {
    let mut report = CentralityReport::default();
    if nodes.is_empty() {
        return report;
    }

    let n = nodes.len();
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    // 邻接表与边权重（无向）
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut edge_weights: HashMap<(usize, usize), f64> = HashMap::new();
    for edge in edges {
        let (Some(&u), Some(&v)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
        else {
            continue;
        };
        adjacency[u].push(v);
        adjacency[v].push(u);
        edge_weights.insert((u, v), edge.value);
        edge_weights.insert((v, u), edge.value);
    }

    // 1. 度中心度：加权度数 / 最大加权度数
    let weighted_degrees: Vec<f64> = (0..n)
        .map(|v| {
            adjacency[v]
                .iter()
                .map(|&w| edge_weights.get(&(v, w)).copied().unwrap_or(1.0))
                .sum()
        })
        .collect();
    let max_degree = weighted_degrees.iter().copied().fold(0.0_f64, f64::max);
    let max_degree = if max_degree > 0.0 { max_degree } else { 1.0 };

    // 2. 介数中心度 - Brandes 算法，逐源点 BFS
    let mut betweenness = vec![0.0; n];
    for s in 0..n {
        let mut stack = Vec::new();
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n]; // 最短路径数
        let mut dist = vec![-1_i64; n];
        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &adjacency[v] {
                // w 首次被发现
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                // 最短路径到 w 经过 v
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        // 依赖回传
        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                betweenness[w] += delta[w];
            }
        }
    }

    // 归一化：n > 2 时除以 (n-1)(n-2)，否则保持 0
    if n > 2 {
        let norm = ((n - 1) * (n - 2)) as f64;
        for score in &mut betweenness {
            *score /= norm;
        }
    }

    // 3. 接近中心度：可达节点数 / 跳数距离之和
    let mut closeness = vec![0.0; n];
    for (v, score) in closeness.iter_mut().enumerate() {
        let distances = bfs_distances(v, &adjacency);
        let mut reachable = 0_usize;
        let mut total = 0_u64;
        for (w, d) in distances.iter().enumerate() {
            if w != v {
                if let Some(d) = d {
                    reachable += 1;
                    total += d;
                }
            }
        }
        if reachable > 0 && total > 0 {
            *score = reachable as f64 / total as f64;
        }
    }

    for (i, node) in nodes.iter().enumerate() {
        let degree = weighted_degrees[i] / max_degree;
        report.degree.insert(node.id.clone(), degree);
        report.betweenness.insert(node.id.clone(), betweenness[i]);
        report.closeness.insert(node.id.clone(), closeness[i]);
    }

    // 更新节点大小（度中心度，带可见性下限）
    for (i, node) in nodes.iter_mut().enumerate() {
        node.value = (weighted_degrees[i] / max_degree).max(NODE_SIZE_FLOOR);
    }

    // 最受欢迎用户：综合中心度 argmax，同分取 id 最小者。
    // 没有任何边时不评选（全零分数没有解释意义）。
    let mut best: Option<(usize, f64)> = None;
    if !edges.is_empty() {
        for i in 0..n {
            let combined = POPULARITY_DEGREE * (weighted_degrees[i] / max_degree)
                + POPULARITY_BETWEENNESS * betweenness[i]
                + POPULARITY_CLOSENESS * closeness[i];
            if best.map_or(true, |(_, score)| combined > score) {
                best = Some((i, combined));
            }
        }
    }
    report.most_popular = best.map(|(i, combined)| {
        let qq = nodes[i].id.clone();
        MostPopularUser {
            name: names.get(&qq).cloned().unwrap_or_else(|| qq.clone()),
            centrality: combined,
            degree: weighted_degrees[i] / max_degree,
            betweenness: betweenness[i],
            closeness: closeness[i],
            qq,
        }
    });

    report
}

/// 单源 BFS 跳数距离；不可达为 `None`
fn bfs_distances(source: usize, adjacency: &[Vec<usize>]) -> Vec<Option<u64>> {
    let mut distances = vec![None; adjacency.len()];
    distances[source] = Some(0);
    let mut queue = VecDeque::new();
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let dv = distances[v].unwrap_or(0);
        for &w in &adjacency[v] {
            if distances[w].is_none() {
                distances[w] = Some(dv + 1);
                queue.push_back(w);
            }
        }
    }

    distances
}
