//! 对弈场
//!
//! 包含:
//! - 玩家描述与策略构造
//! - 终端输入
//! - 单局对弈循环
//! - 多局统计（自对弈 / 对比赛）
//! - 棋局存储

pub mod evaluation;
pub mod game;
pub mod input;
pub mod player;
pub mod storage;

pub use evaluation::{mean, sample_stdev, Arena, ComparisonReport, SelfPlayReport};
pub use game::{ChessMatch, MatchOutcome, MoveClock, DEFAULT_MAX_PLIES};
pub use input::{render_board, ConsoleInput};
pub use player::{PlayerSpec, PlayerSpecError, DEFAULT_MCTS_ITERATIONS};
pub use storage::{SavedGameInfo, StorageManager};
