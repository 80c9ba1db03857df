//! 对弈协议库
//!
//! 包含:
//! - 局面接口 (GameState trait) 与阵营、终局结果
//! - 国际象棋局面实现（走法生成基于 cozy-chess）
//! - FEN 解析、UCI/SAN 记号
//! - 棋谱格式 (JSON)

mod board;
mod error;
mod fen;
mod notation;
mod record;
mod state;

pub use board::{
    color_from_side, file_char, rank_char, side_from_color, square_name, ChessPosition,
    Termination,
};
pub use error::{Result, RulesError};
pub use fen::{Fen, INITIAL_FEN};
pub use notation::Notation;
pub use record::{EndReason, GameMetadata, GameRecord, GameResult, MoveRecord, RECORD_VERSION};
pub use state::{GameState, Outcome, Side};

/// 重导出走法生成库，方便下游直接使用棋盘类型
pub use cozy_chess;
