//! FEN 格式解析和生成
//!
//! 国际象棋 FEN 格式：
//! `<棋盘> <走子方> <易位权> <过路兵> <无吃子步数> <回合数>`
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`

use crate::board::ChessPosition;
use crate::error::{Result, RulesError};

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为局面
    ///
    /// 省略的尾部字段按默认值补齐（`- - 0 1`）。
    pub fn parse(fen: &str) -> Result<ChessPosition> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.is_empty() {
            return Err(RulesError::InvalidFen {
                reason: "Empty FEN string".to_string(),
            });
        }

        Self::check_placement(parts[0])?;

        let side = parts.get(1).copied().unwrap_or("w");
        if side != "w" && side != "b" {
            return Err(RulesError::InvalidFen {
                reason: format!("Invalid side to move: {}", side),
            });
        }

        let castling = parts.get(2).copied().unwrap_or("-");
        let en_passant = parts.get(3).copied().unwrap_or("-");
        let halfmove = parts.get(4).copied().unwrap_or("0");
        let fullmove = parts.get(5).copied().unwrap_or("1");

        let normalized = format!(
            "{} {} {} {} {} {}",
            parts[0], side, castling, en_passant, halfmove, fullmove
        );
        ChessPosition::from_fen(&normalized)
    }

    /// 校验棋盘部分（8 行，每行 8 格）
    fn check_placement(placement: &str) -> Result<()> {
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(RulesError::InvalidFen {
                reason: format!("Expected 8 ranks, got {}", rows.len()),
            });
        }

        for (row_idx, row) in rows.iter().enumerate() {
            let mut width = 0u32;
            for c in row.chars() {
                if let Some(empty) = c.to_digit(10) {
                    width += empty;
                } else if "pnbrqkPNBRQK".contains(c) {
                    width += 1;
                } else {
                    return Err(RulesError::InvalidFen {
                        reason: format!("Invalid piece character: {}", c),
                    });
                }
            }
            if width != 8 {
                return Err(RulesError::InvalidFen {
                    reason: format!("Rank {} has {} files, expected 8", row_idx, width),
                });
            }
        }

        Ok(())
    }

    /// 将局面转换为 FEN 字符串
    pub fn to_string(position: &ChessPosition) -> String {
        position.fen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GameState, Side};

    #[test]
    fn test_parse_initial() {
        let position = Fen::parse(INITIAL_FEN).unwrap();
        assert_eq!(position.legal_actions().len(), 20);
        assert_eq!(position.side_to_move(), Side::White);
    }

    #[test]
    fn test_roundtrip_initial() {
        let position = Fen::parse(INITIAL_FEN).unwrap();
        assert_eq!(Fen::to_string(&position), INITIAL_FEN);
    }

    #[test]
    fn test_parse_short_fen() {
        // 只给棋盘和走子方
        let position = Fen::parse("4k3/8/8/8/8/8/4P3/4K3 b").unwrap();
        assert_eq!(position.side_to_move(), Side::Black);
    }

    #[test]
    fn test_invalid_rank_count() {
        let result = Fen::parse("8/8/8 w - - 0 1");
        assert!(matches!(result, Err(RulesError::InvalidFen { .. })));
    }

    #[test]
    fn test_invalid_rank_width() {
        let result = Fen::parse("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_piece_char() {
        let result = Fen::parse("rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        match result {
            Err(RulesError::InvalidFen { reason }) => assert!(reason.contains('x')),
            other => panic!("expected InvalidFen, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_side() {
        assert!(Fen::parse("4k3/8/8/8/8/8/4P3/4K3 r - - 0 1").is_err());
    }
}
