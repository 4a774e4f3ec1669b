//! 网络分析引擎端到端测试
//!
//! 用手工构造的小型聊天场景验证整条流水线：
//! 消息 → 对话/相似性信号 → 权重合并 → 构图裁剪 → 中心度/社区/指标。

use chatnet::{Message, NetworkAnalyzer, NetworkConfig};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn msg(qq: &str, sender: &str, time: &str, content: &str) -> Message {
    Message::text(qq, sender, time, content)
}

fn msg_mentioning(qq: &str, time: &str, content: &str, mention: &str) -> Message {
    let mut m = Message::text(qq, qq, time, content);
    m.mentions.push(mention.to_string());
    m
}

/// 两轮 A→B→C 快速接龙（各自@上一个发言者）应产生三角形
#[test]
fn test_round_robin_mentions_form_triangle() {
    init_logs();
    let messages = vec![
        msg("A", "甲", "2025-05-10 12:00:00", "走"),
        msg_mentioning("B", "2025-05-10 12:01:00", "好", "A"),
        msg_mentioning("C", "2025-05-10 12:02:00", "嗯", "B"),
        msg_mentioning("A", "2025-05-10 12:03:00", "哦", "C"),
        msg_mentioning("B", "2025-05-10 12:04:00", "行", "A"),
        msg_mentioning("C", "2025-05-10 12:05:00", "等", "B"),
    ];

    let config = NetworkConfig {
        seed: Some(42),
        ..NetworkConfig::default()
    };
    let mut analyzer = NetworkAnalyzer::new(config).unwrap();
    analyzer.load_messages(messages);
    let stats = analyzer.analyze();

    assert_eq!(stats.total_nodes, 3);
    assert_eq!(stats.total_edges, 3);
    assert_eq!(stats.network_density, 1.0);
    assert_eq!(stats.average_clustering, 1.0);
    // 完全图里介数全 0
    for score in stats.betweenness_centrality.values() {
        assert_eq!(*score, 0.0);
    }
    // 每条边的端点都在节点集中
    for edge in &stats.edges {
        assert!(stats.nodes.iter().any(|n| n.id == edge.from));
        assert!(stats.nodes.iter().any(|n| n.id == edge.to));
    }
}

/// A 只和 B 聊、C 只和 B 聊（时段错开）：链式结构，B 介数非零
#[test]
fn test_chain_routes_all_paths_through_middle() {
    init_logs();
    let messages = vec![
        msg("A", "甲", "2025-05-10 12:00:00", "早"),
        msg("B", "乙", "2025-05-10 12:01:00", "早"),
        msg("A", "甲", "2025-05-10 12:02:00", "忙"),
        msg("B", "乙", "2025-05-10 12:03:00", "嗯"),
        // 40 分钟后 B 和 C 的交流，与 A 的消息超出窗口
        msg("B", "乙", "2025-05-10 12:40:00", "在"),
        msg("C", "丙", "2025-05-10 12:41:00", "在"),
        msg("B", "乙", "2025-05-10 12:42:00", "说"),
        msg("C", "丙", "2025-05-10 12:43:00", "好"),
    ];

    let config = NetworkConfig {
        seed: Some(7),
        ..NetworkConfig::default()
    };
    let mut analyzer = NetworkAnalyzer::new(config).unwrap();
    analyzer.load_messages(messages);
    let stats = analyzer.analyze();

    assert_eq!(stats.total_nodes, 3);
    assert_eq!(stats.total_edges, 2);
    assert!(!stats.interaction_matrix.contains_key("A_C"));

    // A↔C 的最短路全部经过 B
    assert!(stats.betweenness_centrality["B"] > 0.0);
    assert_eq!(stats.betweenness_centrality["A"], 0.0);
    assert_eq!(stats.degree_centrality["B"], 1.0);

    let popular = stats.most_popular_user.as_ref().unwrap();
    assert_eq!(popular.qq, "B");
    assert_eq!(popular.name, "乙");

    // 社区互斥：每个社区 ≥2 人且无重复成员
    let mut seen = std::collections::HashSet::new();
    for community in &stats.communities {
        assert!(community.len() >= 2);
        for member in community {
            assert!(seen.insert(member.clone()));
        }
    }
}

/// 没有任何互动的孤立用户不会成为节点
#[test]
fn test_isolated_user_yields_empty_network() {
    init_logs();
    let messages = vec![
        msg("A", "甲", "2025-05-10 12:00:00", "自言自语 第一句"),
        msg("A", "甲", "2025-05-10 12:05:00", "自言自语 第二句"),
    ];
    let mut analyzer = NetworkAnalyzer::default();
    analyzer.load_messages(messages);
    let stats = analyzer.analyze();

    assert_eq!(stats.total_nodes, 0);
    assert_eq!(stats.total_edges, 0);
    assert_eq!(stats.original_nodes_count, 0);
    assert!(stats.communities.is_empty());
    assert!(stats.most_popular_user.is_none());
}

/// 对话窗口之外但词汇高度重叠的两个用户：边完全由相似性信号驱动
#[test]
fn test_similarity_only_edge() {
    init_logs();
    let messages = vec![
        msg("X", "小徐", "2025-05-01 10:00:00", "徒步 路线 规划"),
        msg("X", "小徐", "2025-05-01 10:05:00", "装备 清单 徒步"),
        msg("Y", "小袁", "2025-05-05 20:00:00", "徒步 路线 攻略"),
        msg("Y", "小袁", "2025-05-05 20:05:00", "装备 推荐 徒步"),
    ];

    // 相似度 3/7 ≈ 0.43，权重 0.3×0.43 ≈ 0.13
    let config = NetworkConfig {
        min_interactions: 0.0,
        min_edge_weight: 0.1,
        seed: Some(1),
        ..NetworkConfig::default()
    };
    let mut analyzer = NetworkAnalyzer::new(config).unwrap();
    analyzer.load_messages(messages.clone());
    let stats = analyzer.analyze();

    assert_eq!(stats.total_edges, 1);
    let edge = &stats.edges[0];
    let expected = 0.3 * (3.0 / 7.0);
    assert!((edge.value - expected).abs() < 1e-9);

    // 同样的输入在默认 min_edge_weight=0.2 下被裁掉
    let config = NetworkConfig {
        min_interactions: 0.0,
        seed: Some(1),
        ..NetworkConfig::default()
    };
    let mut analyzer = NetworkAnalyzer::new(config).unwrap();
    analyzer.load_messages(messages);
    let stats = analyzer.analyze();
    assert_eq!(stats.total_nodes, 0);
    assert_eq!(stats.original_edges_count, 1);
}

/// 种子化后重复分析得到完全一致的结果
#[test]
fn test_seeded_analysis_is_idempotent() {
    init_logs();
    let mut messages = Vec::new();
    for round in 0..5 {
        for (qq, sender) in [("A", "甲"), ("B", "乙"), ("C", "丙"), ("D", "丁")] {
            messages.push(msg(
                qq,
                sender,
                &format!("2025-05-10 12:{:02}:00", round * 4 + messages.len() % 4),
                "大家 一起 讨论 话题",
            ));
        }
    }

    let config = NetworkConfig {
        seed: Some(2024),
        ..NetworkConfig::default()
    };
    let mut analyzer = NetworkAnalyzer::new(config).unwrap();
    analyzer.load_messages(messages);

    let first = analyzer.analyze();
    let second = analyzer.analyze();
    assert_eq!(first, second);
    assert!(first.total_nodes > 0);
}

/// 裁剪单调性：裁剪后数量不超过裁剪前；未超限时裁剪是恒等变换
#[test]
fn test_pruning_monotonicity() {
    init_logs();
    let mut messages = Vec::new();
    for round in 0..2 {
        for i in 0..8 {
            let seconds = (round * 8 + i) * 5;
            messages.push(msg(
                &format!("u{i}"),
                &format!("用户{i}"),
                &format!("2025-05-10 12:0{}:{:02}", seconds / 60, seconds % 60),
                "同 一 个 话 题",
            ));
        }
    }

    // 上限收紧到 3 节点 / 2 边
    let tight = NetworkConfig {
        max_nodes_for_viz: 3,
        max_edges_for_viz: 2,
        seed: Some(5),
        ..NetworkConfig::default()
    };
    let mut analyzer = NetworkAnalyzer::new(tight).unwrap();
    analyzer.load_messages(messages.clone());
    let pruned = analyzer.analyze();
    assert!(pruned.total_nodes <= pruned.original_nodes_count);
    assert!(pruned.total_edges <= pruned.original_edges_count);
    assert!(pruned.total_nodes <= 3);
    assert!(pruned.total_edges <= 2);

    // 宽松上限下无裁剪
    let loose = NetworkConfig {
        seed: Some(5),
        ..NetworkConfig::default()
    };
    let mut analyzer = NetworkAnalyzer::new(loose).unwrap();
    analyzer.load_messages(messages);
    let full = analyzer.analyze();
    assert_eq!(full.total_nodes, full.original_nodes_count);
    assert_eq!(full.total_edges, full.original_edges_count);
}

/// 序列化字段名与前端契约一致
#[test]
fn test_stats_json_shape() {
    init_logs();
    let messages = vec![
        msg("10001", "张三", "2025-05-10 12:00:00", "下班 一起 吃饭"),
        msg_mentioning("10002", "2025-05-10 12:01:00", "吃饭 可以", "10001"),
        msg("10001", "张三", "2025-05-10 12:02:00", "走 起"),
        msg("10002", "10002", "2025-05-10 12:03:00", "马上 到"),
    ];
    let config = NetworkConfig {
        seed: Some(3),
        ..NetworkConfig::default()
    };
    let mut analyzer = NetworkAnalyzer::new(config).unwrap();
    analyzer.load_messages(messages);
    let stats = analyzer.analyze();

    let json = serde_json::to_value(&stats).unwrap();
    assert!(json["total_nodes"].as_u64().unwrap() >= 2);
    let node = &json["nodes"][0];
    assert!(node["id"].is_string());
    assert!(node["label"].is_string());
    assert!(node["value"].is_number());
    assert!(node["title"].is_string());
    let edge = &json["edges"][0];
    for key in ["from", "to", "from_name", "to_name", "value", "title"] {
        assert!(!edge[key].is_null(), "edge.{key} 缺失");
    }
    assert!(json["degree_centrality"].is_object());
    assert!(json["interaction_matrix"].is_object());
    assert!(json["network_density"].is_number());
    let popular = &json["most_popular_user"];
    for key in ["qq", "name", "centrality", "degree", "betweenness", "closeness"] {
        assert!(!popular[key].is_null(), "most_popular_user.{key} 缺失");
    }
}

/// 消息乱序输入时结果与有序输入一致（防御性重排）
#[test]
fn test_unsorted_input_matches_sorted() {
    init_logs();
    let sorted = vec![
        msg("A", "甲", "2025-05-10 12:00:00", "一"),
        msg("B", "乙", "2025-05-10 12:01:00", "二"),
        msg("A", "甲", "2025-05-10 12:02:00", "三"),
        msg("B", "乙", "2025-05-10 12:03:00", "四"),
    ];
    let mut shuffled = sorted.clone();
    shuffled.reverse();

    let config = NetworkConfig {
        seed: Some(11),
        ..NetworkConfig::default()
    };
    let mut a1 = NetworkAnalyzer::new(config.clone()).unwrap();
    a1.load_messages(sorted);
    let mut a2 = NetworkAnalyzer::new(config).unwrap();
    a2.load_messages(shuffled);

    assert_eq!(a1.analyze(), a2.analyze());
}
