//! 搜索树节点
//!
//! 节点放在 arena 里，用 [`NodeId`] 下标互相引用；`parent` 只是回指，
//! 所有权只沿 `children` 向下。

use std::fmt;

use protocol::GameState;

/// arena 下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// 根节点
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// 搜索树节点
///
/// `total_value` 始终是根节点走子方视角的累计奖励。
#[derive(Debug, Clone)]
pub struct SearchNode<S: GameState> {
    /// 该节点对应的局面
    pub position: S,
    /// 父节点（根为 None）
    pub parent: Option<NodeId>,
    /// 已展开的子节点：走法 -> 节点
    pub children: Vec<(S::Action, NodeId)>,
    /// 访问次数 N
    pub visit_count: u32,
    /// 累计奖励 W
    pub total_value: f64,
    /// 尚未展开的合法走法
    pub untried_actions: Vec<S::Action>,
    /// 局面是否终局（创建时确定）
    pub terminal: bool,
}

impl<S: GameState> SearchNode<S> {
    /// 创建节点，未展开走法取自局面自己的合法走法
    pub fn new(position: S, parent: Option<NodeId>) -> Self {
        let terminal = position.is_terminal();
        let untried_actions = if terminal {
            Vec::new()
        } else {
            position.legal_actions()
        };
        Self {
            position,
            parent,
            children: Vec::new(),
            visit_count: 0,
            total_value: 0.0,
            untried_actions,
            terminal,
        }
    }

    /// 所有合法走法都已展开
    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried_actions.is_empty()
    }

    /// 平均奖励，未访问时为 None
    pub fn mean_value(&self) -> Option<f64> {
        if self.visit_count == 0 {
            None
        } else {
            Some(self.total_value / self.visit_count as f64)
        }
    }

    /// UCT 分数
    ///
    /// 未访问的节点返回正无穷；`invert` 时利用项取 `1 - W/N`（对手走子的父节点）。
    pub fn uct_score(&self, parent_visits: u32, exploration: f64, invert: bool) -> f64 {
        let Some(mean) = self.mean_value() else {
            return f64::INFINITY;
        };
        let exploitation = if invert { 1.0 - mean } else { mean };
        let n = self.visit_count as f64;
        let exploration_term = exploration * ((parent_visits.max(1) as f64).ln() / n).sqrt();
        exploitation + exploration_term
    }

    /// 记录一次模拟结果
    #[inline]
    pub fn update(&mut self, reward: f64) {
        self.visit_count += 1;
        self.total_value += reward;
    }
}
