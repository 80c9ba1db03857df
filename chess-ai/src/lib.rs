//! 棋类 AI 引擎
//!
//! 包含:
//! - 静态评估函数
//! - 蒙特卡洛树搜索 (UCT)
//! - Minimax + Alpha-Beta 搜索
//! - 开局库
//! - 策略抽象（MCTS / Minimax / 随机 / 人类 / 组合）

mod error;
mod evaluate;
mod mcts;
mod opening;
mod search;
mod stats;
mod strategy;

#[cfg(test)]
mod testing;

pub use error::SearchError;
pub use evaluate::{
    piece_value, terminal_score, ChessEvaluator, EvaluationBreakdown, StaticEvaluator,
    DRAW_SCORE, HEURISTIC_BOUND, LOSS_SCORE, WIN_SCORE,
};
pub use mcts::{MctsConfig, MctsEngine, MctsResult, NodeId, SearchBudget, SearchNode, SearchTree};
pub use opening::{OpeningBook, OpeningEntry, OpeningLine};
pub use search::{Difficulty, MinimaxConfig, MinimaxEngine, MinimaxResult};
pub use stats::{Diagnostics, MctsStats, MinimaxStats, SearchSource};
pub use strategy::{
    ActionInput, CompositeStrategy, HumanStrategy, MctsStrategy, MinimaxStrategy, RandomStrategy,
    Strategy,
};
