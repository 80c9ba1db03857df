//! 国际象棋局面
//!
//! 走法生成交给 `cozy-chess`，这里只负责把它包装成 [`GameState`] 契约，
//! 并补上它不判断的子力不足和局面键。

use std::fmt;

use cozy_chess::{Board, Color, File, GameStatus, Move, Piece, Rank, Square};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RulesError};
use crate::state::{GameState, Outcome, Side};

/// 终局原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// 将死
    Checkmate,
    /// 逼和
    Stalemate,
    /// 五十回合规则
    FiftyMoveRule,
    /// 双方子力不足以将死
    InsufficientMaterial,
}

/// 国际象棋局面（含走子方、易位权、过路兵、回合计数）
#[derive(Clone)]
pub struct ChessPosition {
    board: Board,
}

impl ChessPosition {
    /// 初始局面
    pub fn initial() -> Self {
        Self {
            board: Board::default(),
        }
    }

    /// 从 FEN 解析
    pub fn from_fen(fen: &str) -> Result<Self> {
        let board = fen.trim().parse::<Board>().map_err(|e| RulesError::InvalidFen {
            reason: format!("{:?}", e),
        })?;
        Ok(Self { board })
    }

    /// 从已有棋盘创建
    pub fn from_board(board: Board) -> Self {
        Self { board }
    }

    /// 底层棋盘（只读）
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 完整 FEN
    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    /// 某方是否被将军
    pub fn in_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    /// 合法走法数量（不分配内存）
    pub fn mobility(&self) -> usize {
        let mut count = 0;
        self.board.generate_moves(|moves| {
            count += moves.len();
            false
        });
        count
    }

    /// 终局原因，非终局返回 None
    pub fn termination(&self) -> Option<Termination> {
        match self.board.status() {
            GameStatus::Won => Some(Termination::Checkmate),
            GameStatus::Drawn if self.mobility() == 0 => Some(Termination::Stalemate),
            GameStatus::Drawn => Some(Termination::FiftyMoveRule),
            GameStatus::Ongoing if self.insufficient_material() => {
                Some(Termination::InsufficientMaterial)
            }
            GameStatus::Ongoing => None,
        }
    }

    /// 子力不足：只剩双王，或双王加一个轻子
    pub fn insufficient_material(&self) -> bool {
        let board = &self.board;
        let heavy =
            board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }
        let minors = board.pieces(Piece::Knight) | board.pieces(Piece::Bishop);
        minors.len() <= 1
    }

    /// 王车易位在 cozy-chess 中编码为"王吃己方车"
    pub fn is_castling(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(self.board.side_to_move())
    }

    /// 解析 UCI 走法（王车易位接受 `e1g1` 和 `e1h1` 两种写法）
    pub fn parse_uci(&self, uci: &str) -> Result<Move> {
        let text = uci.trim().to_ascii_lowercase();
        self.legal_actions()
            .into_iter()
            .find(|mv| {
                crate::notation::Notation::to_uci(self, *mv) == text || mv.to_string() == text
            })
            .ok_or_else(|| RulesError::InvalidNotation {
                notation: uci.to_string(),
                position: self.fen(),
            })
    }
}

impl Default for ChessPosition {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for ChessPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}

impl fmt::Debug for ChessPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChessPosition({})", self.board)
    }
}

impl GameState for ChessPosition {
    type Action = Move;
    type Key = String;

    fn side_to_move(&self) -> Side {
        side_from_color(self.board.side_to_move())
    }

    fn legal_actions(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.board.generate_moves(|piece_moves| {
            moves.extend(piece_moves);
            false
        });
        moves
    }

    fn apply(&self, action: Move) -> Result<Self> {
        if !self.board.is_legal(action) {
            return Err(RulesError::IllegalAction {
                action: action.to_string(),
                position: self.fen(),
            });
        }
        let mut board = self.board.clone();
        board.play_unchecked(action);
        Ok(Self { board })
    }

    fn is_terminal(&self) -> bool {
        self.termination().is_some()
    }

    fn outcome(&self, perspective: Side) -> Result<Outcome> {
        match self.termination() {
            // 被将死的是当前走子方
            Some(Termination::Checkmate) => {
                if self.side_to_move() == perspective {
                    Ok(Outcome::Loss)
                } else {
                    Ok(Outcome::Win)
                }
            }
            Some(_) => Ok(Outcome::Draw),
            None => Err(RulesError::NotTerminal {
                position: self.fen(),
            }),
        }
    }

    /// 棋子布局 + 走子方 + 易位权，忽略过路兵和回合计数
    fn key(&self) -> String {
        self.fen()
            .split_whitespace()
            .take(3)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// cozy-chess 颜色转阵营
pub fn side_from_color(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

/// 阵营转 cozy-chess 颜色
pub fn color_from_side(side: Side) -> Color {
    match side {
        Side::White => Color::White,
        Side::Black => Color::Black,
    }
}

/// 格子名，如 `e4`
pub fn square_name(square: Square) -> String {
    format!("{}{}", file_char(square.file()), rank_char(square.rank()))
}

/// 列字母
pub fn file_char(file: File) -> char {
    char::from(b'a' + file as u8)
}

/// 行数字
pub fn rank_char(rank: Rank) -> char {
    char::from(b'1' + rank as u8)
}
