//! 网络分析配置
//!
//! 所有算法参数在构造时一次性确定，一次 `analyze()` 调用之间不共享任何
//! 可变状态（每次分析使用独立的 `NetworkAnalyzer` 实例）。

use serde::{Deserialize, Serialize};

use crate::errors::ChatNetError;

// 算法参数默认值 - 调整为更宽松的设置
fn default_conversation_window() -> f64 {
    30.0 // 分钟：对话窗口大小
}

fn default_min_interactions() -> f64 {
    1.0 // 最小互动分数
}

fn default_similarity_threshold() -> f64 {
    0.1 // 内容相似度阈值
}

fn default_min_edge_weight() -> f64 {
    0.2 // 最小边权重（过滤弱关系）
}

fn default_max_nodes_for_viz() -> usize {
    100
}

fn default_max_edges_for_viz() -> usize {
    300
}

fn default_enable_parallel() -> bool {
    true
}

/// 网络分析器配置
///
/// 经验调参得到的权重常量（0.7/0.3 等）不在这里：它们与算法语义耦合，
/// 以具名常量的形式放在使用它们的模块里。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// 对话窗口大小（分钟）
    #[serde(default = "default_conversation_window")]
    pub conversation_window: f64,

    /// 最小互动分数（低于此值的用户对被丢弃）
    #[serde(default = "default_min_interactions")]
    pub min_interactions: f64,

    /// 内容相似度阈值
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// 最小边权重（过滤弱关系）
    #[serde(default = "default_min_edge_weight")]
    pub min_edge_weight: f64,

    /// 可视化节点数上限
    #[serde(default = "default_max_nodes_for_viz")]
    pub max_nodes_for_viz: usize,

    /// 可视化边数上限
    #[serde(default = "default_max_edges_for_viz")]
    pub max_edges_for_viz: usize,

    /// 启用并行相似度计算
    #[serde(default = "default_enable_parallel")]
    pub enable_parallel: bool,

    /// 分析前按最活跃用户 Top-N 裁剪消息，减少计算量。
    /// 注意：这会改变网络计算的输入范围。
    #[serde(default)]
    pub limit_compute: bool,

    /// 标签传播随机源种子；`None` 时使用系统熵。
    /// 需要可复现社区划分的调用方必须提供种子。
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            conversation_window: default_conversation_window(),
            min_interactions: default_min_interactions(),
            similarity_threshold: default_similarity_threshold(),
            min_edge_weight: default_min_edge_weight(),
            max_nodes_for_viz: default_max_nodes_for_viz(),
            max_edges_for_viz: default_max_edges_for_viz(),
            enable_parallel: default_enable_parallel(),
            limit_compute: false,
            seed: None,
        }
    }
}

impl NetworkConfig {
    /// 校验配置参数
    pub fn validate(&self) -> Result<(), ChatNetError> {
        if self.conversation_window <= 0.0 {
            return Err(ChatNetError::Config(
                "conversation_window must be positive".to_string(),
            ));
        }
        if self.min_interactions < 0.0 {
            return Err(ChatNetError::Config(
                "min_interactions must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ChatNetError::Config(
                "similarity_threshold must be in [0, 1]".to_string(),
            ));
        }
        if self.min_edge_weight < 0.0 {
            return Err(ChatNetError::Config(
                "min_edge_weight must be non-negative".to_string(),
            ));
        }
        if self.max_nodes_for_viz == 0 || self.max_edges_for_viz == 0 {
            return Err(ChatNetError::Config(
                "visualization caps must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
