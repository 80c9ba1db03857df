//! 搜索诊断信息
//!
//! 每次搜索结束后生成，只供统计与日志使用，不影响之后的搜索。

use serde::{Deserialize, Serialize};

/// 走法来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    /// 开局库命中
    OpeningBook,
    /// 只有一个合法走法
    ForcedMove,
    /// 正常搜索
    Search,
}

/// MCTS 统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MctsStats {
    pub iterations: u32,
    pub root_visits: u32,
    pub child_count: usize,
    pub tree_size: usize,
    pub elapsed_ms: u64,
    pub source: SearchSource,
}

impl MctsStats {
    /// 强制走法：没有做任何搜索
    pub fn forced() -> Self {
        Self {
            iterations: 0,
            root_visits: 0,
            child_count: 0,
            tree_size: 0,
            elapsed_ms: 0,
            source: SearchSource::ForcedMove,
        }
    }
}

/// Minimax 统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimaxStats {
    pub depth: i32,
    pub nodes_evaluated: u64,
    /// 根节点走子方视角的最佳分数（开局库/强制走法时为 None）
    pub best_score: Option<f64>,
    pub source: SearchSource,
    /// 命中的开局名称
    pub opening: Option<String>,
}

/// 策略最近一次决策的诊断信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "snake_case")]
pub enum Diagnostics {
    Mcts(MctsStats),
    Minimax(MinimaxStats),
}

impl Diagnostics {
    pub fn source(&self) -> SearchSource {
        match self {
            Diagnostics::Mcts(stats) => stats.source,
            Diagnostics::Minimax(stats) => stats.source,
        }
    }

    /// MCTS 迭代次数或 Minimax 评估节点数
    pub fn work(&self) -> u64 {
        match self {
            Diagnostics::Mcts(stats) => stats.iterations as u64,
            Diagnostics::Minimax(stats) => stats.nodes_evaluated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_json_is_tagged() {
        let diag = Diagnostics::Minimax(MinimaxStats {
            depth: 2,
            nodes_evaluated: 42,
            best_score: Some(15.5),
            source: SearchSource::Search,
            opening: None,
        });
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"engine\":\"minimax\""));
        assert!(json.contains("\"source\":\"search\""));
        let back: Diagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
    }

    #[test]
    fn test_mcts_source_is_always_set() {
        let diag = Diagnostics::Mcts(MctsStats {
            iterations: 50,
            root_visits: 50,
            child_count: 20,
            tree_size: 51,
            elapsed_ms: 3,
            source: SearchSource::Search,
        });
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"engine\":\"mcts\""));
        assert!(json.contains("\"source\":\"search\""));
        assert_eq!(diag.source(), SearchSource::Search);
        assert_eq!(diag.work(), 50);
    }

    #[test]
    fn test_forced_stats_are_empty() {
        let stats = MctsStats::forced();
        assert_eq!(stats.iterations, 0);
        assert_eq!(stats.tree_size, 0);
        let diag = Diagnostics::Mcts(stats);
        assert_eq!(diag.source(), SearchSource::ForcedMove);
        assert_eq!(diag.work(), 0);
    }
}
