//! 社交网络分析引擎 - 智能分析群聊中的互动关系
//!
//! 多维度推断：时间窗口对话分析 + 内容相似性 + @提及 + 回复链。
//! 控制流：消息 → 对话推断 + 内容相似性（两条独立通路）→ 权重合并 →
//! 构图/裁剪 → {中心度, 社区, 网络指标} → `NetworkStats`。
//!
//! 引擎在一次 `analyze()` 内独占全部中间状态，调用之间不保留任何东西；
//! 并发调用请各自构造实例。

use std::collections::BTreeMap;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::NetworkConfig;
use crate::errors::ChatNetError;
use crate::types::Message;

mod centrality;
mod community;
mod conversation;
mod graph;
mod metrics;
mod similarity;

/// 规范化的无向用户对（字典序，保证 (a,b) 与 (b,a) 落到同一条目）
pub(crate) type Pair = (String, String);

pub(crate) fn canonical_pair(a: &str, b: &str) -> Pair {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// 图节点（面向可视化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// 节点唯一标识
    pub id: String,
    /// 展示昵称
    pub label: String,
    /// 可视化大小（度中心度，带下限）
    pub value: f64,
    /// 鼠标悬停提示：昵称 + id
    pub title: String,
}

/// 图的边（无向互动关系）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub from_name: String,
    pub to_name: String,
    /// 合并后的互动权重
    pub value: f64,
    /// 鼠标悬停提示：双端昵称 + 权重
    pub title: String,
}

/// 最受欢迎的用户：综合中心度 argmax，附带各分量便于解释
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostPopularUser {
    pub qq: String,
    pub name: String,
    /// 综合评分 = 0.5*度 + 0.3*介数 + 0.2*接近
    pub centrality: f64,
    pub degree: f64,
    pub betweenness: f64,
    pub closeness: f64,
}

/// 最活跃的互动对：权重最大的边
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostActivePair {
    pub pair: [String; 2],
    pub name1: String,
    pub name2: String,
    pub weight: f64,
}

/// 社交网络统计数据容器（JSON 可序列化，字段名与前端契约一致）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    // 网络基本信息
    pub total_nodes: usize,
    pub total_edges: usize,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,

    // 裁剪透明性：过滤前的数量
    pub original_nodes_count: usize,
    pub original_edges_count: usize,

    // 中心度指标
    pub degree_centrality: BTreeMap<String, f64>,
    pub betweenness_centrality: BTreeMap<String, f64>,
    pub closeness_centrality: BTreeMap<String, f64>,

    // 互动统计
    pub most_popular_user: Option<MostPopularUser>,
    pub most_active_pair: Option<MostActivePair>,
    /// 扁平化互动矩阵："a_b" → 权重（仅幸存边）
    pub interaction_matrix: BTreeMap<String, f64>,

    // 网络特征（保留 3 位小数）
    pub network_density: f64,
    pub average_clustering: f64,
    pub average_path_length: f64,

    // 社区检测（单人社区已排除）
    pub communities: Vec<Vec<String>>,
}

/// 智能社交网络分析器
///
/// 用法：`new(config)` → `load_messages(...)` → `analyze()`。
#[derive(Debug, Clone)]
pub struct NetworkAnalyzer {
    config: NetworkConfig,
    messages: Vec<Message>,
    /// qq → 昵称映射（取首次出现的非系统消息）
    qq_to_name: BTreeMap<String, String>,
}

impl Default for NetworkAnalyzer {
    fn default() -> Self {
        Self {
            config: NetworkConfig::default(),
            messages: Vec::new(),
            qq_to_name: BTreeMap::new(),
        }
    }
}

impl NetworkAnalyzer {
    /// 以给定配置构造分析器；非法配置返回错误
    pub fn new(config: NetworkConfig) -> Result<Self, ChatNetError> {
        config.validate()?;
        Ok(Self {
            config,
            messages: Vec::new(),
            qq_to_name: BTreeMap::new(),
        })
    }

    /// 加载消息列表
    ///
    /// 调用方应已按时间排好序；这里仍按 (有无结构化时间戳, 时间戳) 防御性
    /// 重排，缺失 `timestamp_ms` 的旧数据回退到 `time` 字符串比较，保证
    /// 确定的处理顺序。
    pub fn load_messages(&mut self, mut messages: Vec<Message>) {
        messages.sort_by_cached_key(|m| match m.timestamp_ms {
            Some(ms) if ms > 0 => (0_u8, ms, String::new()),
            _ => (1_u8, 0, m.time.clone()),
        });

        // 可选：按最活跃用户 Top-N 裁剪计算范围
        if self.config.limit_compute {
            let mut user_counts: BTreeMap<&str, usize> = BTreeMap::new();
            for msg in &messages {
                if !msg.qq.is_empty() {
                    *user_counts.entry(&msg.qq).or_insert(0) += 1;
                }
            }
            let mut ranked: Vec<(&str, usize)> = user_counts.into_iter().collect();
            ranked.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then(a.cmp(b)));
            let allowed: std::collections::BTreeSet<String> = ranked
                .into_iter()
                .take(self.config.max_nodes_for_viz.max(1))
                .map(|(qq, _)| qq.to_string())
                .collect();
            messages.retain(|m| allowed.contains(&m.qq));
        }

        // 构建 qq → 昵称映射
        for msg in &messages {
            if msg.is_system {
                continue;
            }
            if !msg.qq.is_empty() && !msg.sender.is_empty() {
                self.qq_to_name
                    .entry(msg.qq.clone())
                    .or_insert_with(|| msg.sender.clone());
            }
        }

        self.messages = messages;
    }

    /// 执行完整的社交网络分析
    pub fn analyze(&self) -> NetworkStats {
        let mut stats = NetworkStats::default();
        if self.messages.is_empty() {
            return stats;
        }

        // 1. 两条独立的信号通路
        let conversations =
            conversation::extract_conversations(&self.messages, self.config.conversation_window);
        let similarities = similarity::analyze_content_similarity(
            &self.messages,
            self.config.similarity_threshold,
            self.config.enable_parallel,
        );
        debug!(
            "signals: {} conversation pairs, {} similarity pairs",
            conversations.len(),
            similarities.len()
        );

        // 2. 综合互动权重 → 构图与裁剪
        let weights = graph::combine_interaction_weights(
            &conversations,
            &similarities,
            self.config.min_interactions,
        );
        let parts = graph::construct_graph(weights, &self.config, &self.qq_to_name);

        stats.original_nodes_count = parts.original_nodes_count;
        stats.original_edges_count = parts.original_edges_count;
        stats.nodes = parts.nodes;
        stats.edges = parts.edges;
        stats.interaction_matrix = parts.interaction_matrix;
        stats.total_nodes = stats.nodes.len();
        stats.total_edges = stats.edges.len();

        // 3. 三个独立的图消费者：中心度、社区、整体指标
        let report =
            centrality::compute_centrality(&mut stats.nodes, &stats.edges, &self.qq_to_name);
        stats.degree_centrality = report.degree;
        stats.betweenness_centrality = report.betweenness;
        stats.closeness_centrality = report.closeness;
        stats.most_popular_user = report.most_popular;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        stats.communities = community::detect_communities(&stats.nodes, &stats.edges, &mut rng);
        stats.most_active_pair = community::most_active_pair(&stats.edges, &self.qq_to_name);

        let network_metrics = metrics::compute_network_metrics(&stats.nodes, &stats.edges);
        stats.network_density = network_metrics.density;
        stats.average_clustering = network_metrics.average_clustering;
        stats.average_path_length = network_metrics.average_path_length;

        info!(
            "network analysis done: {} nodes ({} before pruning), {} edges ({}), {} communities",
            stats.total_nodes,
            stats.original_nodes_count,
            stats.total_edges,
            stats.original_edges_count,
            stats.communities.len()
        );

        stats
    }
}
