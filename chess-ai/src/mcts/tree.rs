//! 搜索树（arena）
//!
//! 选择、扩展、回传三个阶段都在这里；模拟在引擎里对局面副本进行。

use protocol::{GameState, Side};
use rand::Rng;

use super::node::{NodeId, SearchNode};
use crate::error::SearchError;

/// 单次搜索调用拥有的整棵树，调用结束即丢弃
#[derive(Debug)]
pub struct SearchTree<S: GameState> {
    nodes: Vec<SearchNode<S>>,
    root_side: Side,
}

impl<S: GameState> SearchTree<S> {
    /// 以给定局面为根建树
    pub fn new(root: S) -> Self {
        let root_side = root.side_to_move();
        Self {
            nodes: vec![SearchNode::new(root, None)],
            root_side,
        }
    }

    pub fn root(&self) -> &SearchNode<S> {
        &self.nodes[NodeId::ROOT.index()]
    }

    pub fn node(&self, id: NodeId) -> &SearchNode<S> {
        &self.nodes[id.index()]
    }

    /// 奖励所参照的一方
    pub fn root_side(&self) -> Side {
        self.root_side
    }

    /// 节点总数
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 选择：从根出发，沿 UCT 最大的子节点下降，直到遇到终局或未完全展开的节点
    pub fn select(&self, exploration: f64, adversarial: bool) -> NodeId {
        let mut current = NodeId::ROOT;
        loop {
            let node = self.node(current);
            if node.terminal || !node.is_fully_expanded() {
                return current;
            }
            match self.best_child(current, exploration, adversarial) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// UCT 最大的子节点
    ///
    /// 未访问的子节点优先（第一个即返回）；分数相同时保留靠前的子节点。
    pub fn best_child(&self, id: NodeId, exploration: f64, adversarial: bool) -> Option<NodeId> {
        let node = self.node(id);
        let invert = adversarial && node.position.side_to_move() != self.root_side;

        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child_id) in &node.children {
            let child = self.node(child_id);
            if child.visit_count == 0 {
                return Some(child_id);
            }
            let score = child.uct_score(node.visit_count, exploration, invert);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((child_id, score));
            }
        }
        best.map(|(child_id, _)| child_id)
    }

    /// 扩展：随机取一个未尝试的走法生成子节点
    ///
    /// 终局节点或已完全展开的节点原样返回。
    pub fn expand<R: Rng>(&mut self, id: NodeId, rng: &mut R) -> Result<NodeId, SearchError> {
        let node = &mut self.nodes[id.index()];
        if node.terminal || node.untried_actions.is_empty() {
            return Ok(id);
        }

        let index = rng.gen_range(0..node.untried_actions.len());
        let action = node.untried_actions.swap_remove(index);
        let position = node.position.apply(action)?;

        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes[id.index()].children.push((action, child_id));
        self.nodes.push(SearchNode::new(position, Some(id)));
        Ok(child_id)
    }

    /// 回传：从工作节点到根（含），每个节点累加同一个奖励
    pub fn backpropagate(&mut self, id: NodeId, reward: f64) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &mut self.nodes[node_id.index()];
            node.update(reward);
            current = node.parent;
        }
    }

    /// 根节点访问次数最多的走法（次数相同取靠前的）
    pub fn best_action(&self) -> Option<(S::Action, NodeId)> {
        let mut best: Option<(S::Action, NodeId, u32)> = None;
        for &(action, child_id) in &self.root().children {
            let visits = self.node(child_id).visit_count;
            if best.map_or(true, |(_, _, best_visits)| visits > best_visits) {
                best = Some((action, child_id, visits));
            }
        }
        best.map(|(action, child_id, _)| (action, child_id))
    }

    /// 根节点的 (走法, 访问次数, 平均奖励)
    pub fn root_children(&self) -> Vec<(S::Action, u32, f64)> {
        self.root()
            .children
            .iter()
            .map(|&(action, child_id)| {
                let child = self.node(child_id);
                (action, child.visit_count, child.mean_value().unwrap_or(0.0))
            })
            .collect()
    }
}
