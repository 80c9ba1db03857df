//! 测试用的小型博弈树
//!
//! 局面就是从根出发的走法序列，分支数和最大深度固定；终局、结果和静态分都由路径哈希决定，
//! 足够小，可以穷举验证剪枝和统计量。

use std::fmt;

use protocol::{GameState, Outcome, RulesError, Side};

use crate::evaluate::StaticEvaluator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeGame {
    pub path: Vec<u8>,
    pub branching: u8,
    pub max_depth: usize,
    /// 是否允许提前终局
    pub early_terminals: bool,
}

impl TreeGame {
    pub fn new(branching: u8, max_depth: usize) -> Self {
        Self {
            path: Vec::new(),
            branching,
            max_depth,
            early_terminals: true,
        }
    }

    /// 只有到达最大深度才终局
    pub fn uniform(branching: u8, max_depth: usize) -> Self {
        Self {
            early_terminals: false,
            ..Self::new(branching, max_depth)
        }
    }

    pub fn hash(&self) -> u64 {
        let mut h: u64 = 0x9E37_79B9_7F4A_7C15 ^ self.branching as u64;
        for &step in &self.path {
            h = h.wrapping_add(step as u64 + 1).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            h ^= h >> 31;
        }
        h
    }

    fn winner(&self) -> Option<Side> {
        match self.hash() % 3 {
            0 => Some(Side::White),
            1 => Some(Side::Black),
            _ => None,
        }
    }
}

impl fmt::Display for TreeGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self.path.iter().map(|s| s.to_string()).collect();
        write!(f, "tree[{}]", steps.join("."))
    }
}

impl GameState for TreeGame {
    type Action = u8;
    type Key = Vec<u8>;

    fn side_to_move(&self) -> Side {
        if self.path.len() % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    fn legal_actions(&self) -> Vec<u8> {
        if self.is_terminal() {
            Vec::new()
        } else {
            (0..self.branching).collect()
        }
    }

    fn apply(&self, action: u8) -> protocol::Result<Self> {
        if self.is_terminal() || action >= self.branching {
            return Err(RulesError::IllegalAction {
                action: action.to_string(),
                position: self.to_string(),
            });
        }
        let mut next = self.clone();
        next.path.push(action);
        Ok(next)
    }

    fn is_terminal(&self) -> bool {
        if self.path.len() >= self.max_depth {
            return true;
        }
        self.early_terminals && !self.path.is_empty() && self.hash() % 7 == 0
    }

    fn outcome(&self, perspective: Side) -> protocol::Result<Outcome> {
        if !self.is_terminal() {
            return Err(RulesError::NotTerminal {
                position: self.to_string(),
            });
        }
        Ok(match self.winner() {
            Some(side) if side == perspective => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Draw,
        })
    }

    fn key(&self) -> Vec<u8> {
        self.path.clone()
    }
}

/// 路径哈希决定的静态分，范围 [-50, 50]
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeEvaluator;

impl StaticEvaluator<TreeGame> for TreeEvaluator {
    fn evaluate(&self, state: &TreeGame, perspective: Side) -> f64 {
        let score = (state.hash() % 101) as f64 - 50.0;
        match perspective {
            Side::White => score,
            Side::Black => -score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_game_contract() {
        let game = TreeGame::uniform(3, 2);
        assert_eq!(game.legal_actions(), vec![0, 1, 2]);
        let child = game.apply(1).unwrap();
        assert_eq!(child.side_to_move(), Side::Black);
        let leaf = child.apply(2).unwrap();
        assert!(leaf.is_terminal());
        assert!(leaf.legal_actions().is_empty());
        assert!(leaf.outcome(Side::White).is_ok());
        assert!(game.apply(3).is_err());
    }

    #[test]
    fn test_outcome_is_perspective_consistent() {
        let leaf = TreeGame::uniform(2, 1).apply(0).unwrap();
        let white = leaf.outcome(Side::White).unwrap();
        let black = leaf.outcome(Side::Black).unwrap();
        assert_eq!(white.flipped(), black);
    }
}
