//! Minimax 搜索引擎
//!
//! 深度受限的 Minimax + Alpha-Beta 剪枝，可选开局库短路

use std::sync::Arc;

use protocol::{GameState, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SearchError;
use crate::evaluate::{terminal_score, StaticEvaluator};
use crate::opening::OpeningBook;
use crate::stats::{MinimaxStats, SearchSource};

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Minimax 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimaxConfig {
    /// 最大搜索深度（根节点算第一层；≤ 1 时只对根的子局面做静态评估）
    pub max_depth: i32,
    pub use_opening_book: bool,
}

impl MinimaxConfig {
    pub fn new(max_depth: i32) -> Self {
        Self {
            max_depth,
            use_opening_book: false,
        }
    }

    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                max_depth: 1,
                use_opening_book: false,
            },
            Difficulty::Medium => Self {
                max_depth: 2,
                use_opening_book: false,
            },
            Difficulty::Hard => Self {
                max_depth: 3,
                use_opening_book: true,
            },
        }
    }
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Medium)
    }
}

/// 搜索结果
#[derive(Debug, Clone, PartialEq)]
pub struct MinimaxResult<A> {
    pub action: A,
    pub stats: MinimaxStats,
}

/// Minimax 引擎
pub struct MinimaxEngine<S: GameState, E> {
    config: MinimaxConfig,
    evaluator: E,
    book: Option<Arc<OpeningBook<S>>>,
    nodes_evaluated: u64,
}

impl<S: GameState, E: StaticEvaluator<S>> MinimaxEngine<S, E> {
    /// 创建新的引擎
    pub fn new(config: MinimaxConfig, evaluator: E) -> Self {
        Self {
            config,
            evaluator,
            book: None,
            nodes_evaluated: 0,
        }
    }

    /// 附加开局库（仅在 `use_opening_book` 打开时查询）
    pub fn with_opening_book(mut self, book: Arc<OpeningBook<S>>) -> Self {
        self.book = Some(book);
        self
    }

    pub fn config(&self) -> &MinimaxConfig {
        &self.config
    }

    /// 最近一次搜索评估的节点数
    pub fn nodes_evaluated(&self) -> u64 {
        self.nodes_evaluated
    }

    /// 搜索最佳走法
    pub fn search(&mut self, state: &S) -> Result<MinimaxResult<S::Action>, SearchError> {
        self.nodes_evaluated = 0;

        if state.is_terminal() {
            return Err(SearchError::no_legal_action(state));
        }
        let actions = state.legal_actions();
        if actions.is_empty() {
            return Err(SearchError::no_legal_action(state));
        }

        // 开局库：每次调用都先查
        if let Some(result) = self.book_move(state, &actions)? {
            return Ok(result);
        }

        if actions.len() == 1 {
            return Ok(MinimaxResult {
                action: actions[0],
                stats: MinimaxStats {
                    depth: self.config.max_depth,
                    nodes_evaluated: 0,
                    best_score: None,
                    source: SearchSource::ForcedMove,
                    opening: None,
                },
            });
        }

        // 相同分数保留先找到的走法
        let scores = self.score_actions(state, &actions)?;
        let mut best = scores[0];
        for &(action, score) in &scores[1..] {
            if score > best.1 {
                best = (action, score);
            }
        }

        debug!(
            position = %state,
            action = %best.0,
            score = best.1,
            depth = self.config.max_depth,
            nodes = self.nodes_evaluated,
            "minimax search finished"
        );

        Ok(MinimaxResult {
            action: best.0,
            stats: MinimaxStats {
                depth: self.config.max_depth,
                nodes_evaluated: self.nodes_evaluated,
                best_score: Some(best.1),
                source: SearchSource::Search,
                opening: None,
            },
        })
    }

    /// 根节点每个走法的分数（根节点走子方视角，按合法走法顺序）
    pub fn root_scores(&mut self, state: &S) -> Result<Vec<(S::Action, f64)>, SearchError> {
        self.nodes_evaluated = 0;
        if state.is_terminal() {
            return Err(SearchError::no_legal_action(state));
        }
        let actions = state.legal_actions();
        self.score_actions(state, &actions)
    }

    fn score_actions(
        &mut self,
        state: &S,
        actions: &[S::Action],
    ) -> Result<Vec<(S::Action, f64)>, SearchError> {
        let perspective = state.side_to_move();
        let depth = self.config.max_depth - 1;
        let mut scores = Vec::with_capacity(actions.len());
        for &action in actions {
            let child = state.apply(action)?;
            let score = self.alpha_beta(
                &child,
                depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                false,
                perspective,
            )?;
            scores.push((action, score));
        }
        Ok(scores)
    }

    fn book_move(
        &self,
        state: &S,
        actions: &[S::Action],
    ) -> Result<Option<MinimaxResult<S::Action>>, SearchError> {
        if !self.config.use_opening_book {
            return Ok(None);
        }
        let Some(book) = &self.book else {
            return Ok(None);
        };
        let Some(entry) = book.lookup(&state.key()) else {
            return Ok(None);
        };
        if !actions.contains(&entry.action) {
            warn!(
                position = %state,
                action = %entry.action,
                opening = %entry.name,
                "opening book move is not legal here"
            );
            return Err(SearchError::illegal_action(state, entry.action));
        }
        debug!(opening = %entry.name, action = %entry.notation, "opening book hit");
        Ok(Some(MinimaxResult {
            action: entry.action,
            stats: MinimaxStats {
                depth: self.config.max_depth,
                nodes_evaluated: 0,
                best_score: None,
                source: SearchSource::OpeningBook,
                opening: Some(entry.name.clone()),
            },
        }))
    }

    /// Alpha-Beta 搜索
    ///
    /// 分数始终是 `perspective` 一方的视角；`maximizing` 表示当前层由 `perspective` 走子。
    fn alpha_beta(
        &mut self,
        state: &S,
        depth: i32,
        mut alpha: f64,
        mut beta: f64,
        maximizing: bool,
        perspective: Side,
    ) -> Result<f64, SearchError> {
        self.nodes_evaluated += 1;

        if state.is_terminal() {
            return Ok(terminal_score(state.outcome(perspective)?));
        }
        if depth <= 0 {
            return Ok(self.evaluator.evaluate(state, perspective));
        }

        let actions = state.legal_actions();
        if actions.is_empty() {
            return Ok(self.evaluator.evaluate(state, perspective));
        }

        if maximizing {
            let mut value = f64::NEG_INFINITY;
            for action in actions {
                let child = state.apply(action)?;
                let score = self.alpha_beta(&child, depth - 1, alpha, beta, false, perspective)?;
                value = value.max(score);
                alpha = alpha.max(value);
                if beta <= alpha {
                    break; // Beta 剪枝
                }
            }
            Ok(value)
        } else {
            let mut value = f64::INFINITY;
            for action in actions {
                let child = state.apply(action)?;
                let score = self.alpha_beta(&child, depth - 1, alpha, beta, true, perspective)?;
                value = value.min(score);
                beta = beta.min(value);
                if beta <= alpha {
                    break; // Alpha 剪枝
                }
            }
            Ok(value)
        }
    }
}
