//! 走法记号
//!
//! - UCI：`e2e4`、`e7e8q`，王车易位写作王的目标格（`e1g1`）
//! - SAN：`Nf3`、`exd5`、`O-O`、`e8=Q+`，同类棋子可达同一格时按列/行消歧义

use cozy_chess::{File, Move, Piece, Square};

use crate::board::{file_char, rank_char, square_name, ChessPosition, Termination};
use crate::error::{Result, RulesError};
use crate::state::GameState;

/// 走法记号
pub struct Notation;

impl Notation {
    /// 标准 UCI 记号
    pub fn to_uci(position: &ChessPosition, mv: Move) -> String {
        let to = if position.is_castling(mv) {
            Self::castling_target(mv)
        } else {
            mv.to
        };
        let mut text = format!("{}{}", square_name(mv.from), square_name(to));
        if let Some(piece) = mv.promotion {
            text.push(piece_char(piece).to_ascii_lowercase());
        }
        text
    }

    /// 标准代数记号（SAN）
    pub fn to_san(position: &ChessPosition, mv: Move) -> Result<String> {
        let board = position.board();
        let piece = board.piece_on(mv.from).ok_or_else(|| RulesError::IllegalAction {
            action: mv.to_string(),
            position: position.fen(),
        })?;
        // 先走一步，顺便校验合法性
        let next = position.apply(mv)?;

        let mut san = if position.is_castling(mv) {
            if (mv.to.file() as u8) > (mv.from.file() as u8) {
                "O-O".to_string()
            } else {
                "O-O-O".to_string()
            }
        } else {
            let capture = board.color_on(mv.to).is_some()
                || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

            let mut text = String::new();
            if piece == Piece::Pawn {
                if capture {
                    text.push(file_char(mv.from.file()));
                }
            } else {
                text.push(piece_char(piece));
                text.push_str(&Self::disambiguation(position, mv, piece));
            }
            if capture {
                text.push('x');
            }
            text.push_str(&square_name(mv.to));
            if let Some(promotion) = mv.promotion {
                text.push('=');
                text.push(piece_char(promotion));
            }
            text
        };

        if next.termination() == Some(Termination::Checkmate) {
            san.push('#');
        } else if next.in_check() {
            san.push('+');
        }
        Ok(san)
    }

    /// 同类棋子能走到同一格时的消歧义前缀
    fn disambiguation(position: &ChessPosition, mv: Move, piece: Piece) -> String {
        let board = position.board();
        let rivals: Vec<Square> = position
            .legal_actions()
            .into_iter()
            .filter(|other| {
                other.to == mv.to
                    && other.from != mv.from
                    && board.piece_on(other.from) == Some(piece)
            })
            .map(|other| other.from)
            .collect();

        if rivals.is_empty() {
            return String::new();
        }

        let same_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
        let same_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());

        if !same_file {
            file_char(mv.from.file()).to_string()
        } else if !same_rank {
            rank_char(mv.from.rank()).to_string()
        } else {
            square_name(mv.from)
        }
    }

    /// 王车易位时王实际落到的格子
    fn castling_target(mv: Move) -> Square {
        let file = if (mv.to.file() as u8) > (mv.from.file() as u8) {
            File::G
        } else {
            File::C
        };
        Square::new(file, mv.from.rank())
    }
}

/// 棋子字母（大写）
fn piece_char(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn san_of(fen: &str, uci: &str) -> String {
        let position = ChessPosition::from_fen(fen).unwrap();
        let mv = position.parse_uci(uci).unwrap();
        Notation::to_san(&position, mv).unwrap()
    }

    #[test]
    fn test_pawn_and_knight_moves() {
        let position = ChessPosition::initial();
        let e4 = position.parse_uci("e2e4").unwrap();
        assert_eq!(Notation::to_san(&position, e4).unwrap(), "e4");
        let nf3 = position.parse_uci("g1f3").unwrap();
        assert_eq!(Notation::to_san(&position, nf3).unwrap(), "Nf3");
    }

    #[test]
    fn test_uci_roundtrip_for_all_initial_moves() {
        let position = ChessPosition::initial();
        for mv in position.legal_actions() {
            let uci = Notation::to_uci(&position, mv);
            assert_eq!(position.parse_uci(&uci).unwrap(), mv, "UCI 记号应能解析回原走法: {}", uci);
        }
    }

    #[test]
    fn test_pawn_capture() {
        // 1.e4 d5 之后 exd5
        let san = san_of("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2", "e4d5");
        assert_eq!(san, "exd5");
    }

    #[test]
    fn test_castling() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(san_of(fen, "e1g1"), "O-O");
        assert_eq!(san_of(fen, "e1c1"), "O-O-O");

        let position = ChessPosition::from_fen(fen).unwrap();
        let mv = position.parse_uci("e1h1").unwrap();
        assert_eq!(Notation::to_uci(&position, mv), "e1g1");
    }

    #[test]
    fn test_disambiguation_by_file() {
        // 两个车都能到 d1
        let san = san_of("4k3/8/8/8/8/8/8/R4RK1 w - - 0 1", "a1d1");
        assert_eq!(san, "Rad1");
    }

    #[test]
    fn test_disambiguation_by_rank() {
        // a1 和 a5 的车都能到 a3
        let san = san_of("4k3/8/8/R7/8/8/8/R5K1 w - - 0 1", "a1a3");
        assert_eq!(san, "R1a3");
    }

    #[test]
    fn test_promotion_and_check() {
        let san = san_of("8/4P3/8/8/8/8/8/k6K w - - 0 1", "e7e8q");
        assert_eq!(san, "e8=Q");
        let san = san_of("k7/4P3/8/8/8/8/8/7K w - - 0 1", "e7e8q");
        assert_eq!(san, "e8=Q+");
    }

    #[test]
    fn test_mate_suffix() {
        let san = san_of("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", "a1a8");
        assert_eq!(san, "Ra8#");
    }

    #[test]
    fn test_parse_uci_rejects_unknown() {
        let position = ChessPosition::initial();
        assert!(matches!(
            position.parse_uci("e2e5"),
            Err(RulesError::InvalidNotation { .. })
        ));
    }
}
