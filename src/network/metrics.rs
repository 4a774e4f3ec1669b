//! 网络整体指标：密度、平均聚类系数、平均最短路径长度
//!
//! 三项都只在裁剪后的图上计算；节点数不超过 1 时全部取 0（除零路径
//! 都有守卫）。输出按 JSON 边界惯例保留 3 位小数。

use std::collections::{HashMap, VecDeque};

use super::{Edge, Node};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct NetworkMetrics {
    pub density: f64,
    pub average_clustering: f64,
    pub average_path_length: f64,
}

/// 计算网络整体指标
pub(crate) fn compute_network_metrics(nodes: &[Node], edges: &[Edge]) -> NetworkMetrics {
    let n = nodes.len();
    if n <= 1 {
        return NetworkMetrics::default();
    }

    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut edge_count = 0_usize;
    for edge in edges {
        let (Some(&u), Some(&v)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
        else {
            continue;
        };
        adjacency[u].push(v);
        adjacency[v].push(u);
        edge_count += 1;
    }

    // 1. 网络密度 = 边数 / 最大可能边数
    let max_possible = (n * (n - 1)) as f64 / 2.0;
    let density = edge_count as f64 / max_possible;

    // 2. 平均聚类系数：度数 < 2 的节点贡献 0，参与平均
    let mut clustering_sum = 0.0;
    for v in 0..n {
        let neighbors = &adjacency[v];
        let k = neighbors.len();
        if k < 2 {
            continue;
        }

        // 邻居之间的实际边数
        let mut between = 0_usize;
        for i in 0..k {
            for j in i + 1..k {
                if adjacency[neighbors[i]].contains(&neighbors[j]) {
                    between += 1;
                }
            }
        }
        clustering_sum += between as f64 / (k * (k - 1)) as f64 * 2.0;
    }
    let average_clustering = clustering_sum / n as f64;

    // 3. 平均路径长度：逐源点 BFS，不可达的有序对不计入分子分母
    let mut total_length = 0_u64;
    let mut path_count = 0_u64;
    for source in 0..n {
        let mut distances = vec![None; n];
        distances[source] = Some(0_u64);
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
        for (target, d) in distances.iter().enumerate() {
            if target != source {
                if let Some(d) = d {
                    total_length += d;
                    path_count += 1;
                }
            }
        }
    }
    let average_path_length = if path_count > 0 {
        total_length as f64 / path_count as f64
    } else {
        0.0
    };

    NetworkMetrics {
        density: round3(density),
        average_clustering: round3(average_clustering),
        average_path_length: round3(average_path_length),
    }
}

/// JSON 边界保留 3 位小数
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            label: id.to_string(),
            value: 1.0,
            title: String::new(),
        }
    }

    fn edge(from: &str, to: &str) -> Edge {
        Edge {
            from: from.to_string(),
            to: to.to_string(),
            from_name: from.to_string(),
            to_name: to.to_string(),
            value: 1.0,
            title: String::new(),
        }
    }

    #[test]
    fn test_complete_triangle() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("a", "c")];
        let metrics = compute_network_metrics(&nodes, &edges);
        assert_eq!(metrics.density, 1.0);
        assert_eq!(metrics.average_clustering, 1.0);
        assert_eq!(metrics.average_path_length, 1.0);
    }

    #[test]
    fn test_path_graph_metrics() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![edge("a", "b"), edge("b", "c")];
        let metrics = compute_network_metrics(&nodes, &edges);
        // 2 条边 / 3 种可能
        assert!((metrics.density - 0.667).abs() < 1e-9);
        // 没有三角形
        assert_eq!(metrics.average_clustering, 0.0);
        // 距离：a-b 1, b-c 1, a-c 2，双向共 8/6
        assert!((metrics.average_path_length - 1.333).abs() < 1e-9);
    }

    #[test]
    fn test_disconnected_pairs_excluded_from_path_length() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d")];
        let edges = vec![edge("a", "b"), edge("c", "d")];
        let metrics = compute_network_metrics(&nodes, &edges);
        // 只有连通的有序对参与平均
        assert_eq!(metrics.average_path_length, 1.0);
        assert!(metrics.density < 1.0);
    }

    #[test]
    fn test_degenerate_graphs_are_zero() {
        assert_eq!(
            compute_network_metrics(&[], &[]),
            NetworkMetrics::default()
        );
        assert_eq!(
            compute_network_metrics(&[node("a")], &[]),
            NetworkMetrics::default()
        );
    }

    #[test]
    fn test_density_bounds() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d")];
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("c", "d")];
        let metrics = compute_network_metrics(&nodes, &edges);
        assert!(metrics.density > 0.0 && metrics.density < 1.0);
    }
}
