//! 局面评估函数
//!
//! 子力分按厘兵计，其余四项（机动性、位置、王安全、兵形）各自截断，
//! 四项上限之和 [`HEURISTIC_BOUND`] 小于一个兵，保证位置因素永远盖不过子力得失。

use protocol::cozy_chess::{Board, Color, File, Piece, Rank, Square};
use protocol::{ChessPosition, GameState, Outcome, Side};

/// 终局得分：胜
pub const WIN_SCORE: f64 = 100_000.0;
/// 终局得分：和
pub const DRAW_SCORE: f64 = 0.0;
/// 终局得分：负
pub const LOSS_SCORE: f64 = -WIN_SCORE;

/// 机动性：每个合法走法的分值
pub const MOBILITY_WEIGHT: f64 = 0.1;
/// 机动性上限
pub const MOBILITY_CAP: f64 = 20.0;
/// 位置分上限
pub const PLACEMENT_CAP: f64 = 30.0;
/// 王安全上限
pub const KING_SAFETY_CAP: f64 = 25.0;
/// 兵形上限
pub const PAWN_STRUCTURE_CAP: f64 = 15.0;
/// 非子力项的总上限
pub const HEURISTIC_BOUND: f64 =
    MOBILITY_CAP + PLACEMENT_CAP + KING_SAFETY_CAP + PAWN_STRUCTURE_CAP;

/// 已易位的王安全加分
const CASTLED_BONUS: f64 = 20.0;
/// 保留易位权的加分
const CASTLING_RIGHTS_BONUS: f64 = 10.0;
/// 每个兵的兵形加分
const PAWN_COUNT_BONUS: f64 = 1.0;
/// 每条叠兵列的扣分
const DOUBLED_PAWN_PENALTY: f64 = 5.0;

/// 终局结果对应的规范分值
pub fn terminal_score(outcome: Outcome) -> f64 {
    match outcome {
        Outcome::Win => WIN_SCORE,
        Outcome::Draw => DRAW_SCORE,
        Outcome::Loss => LOSS_SCORE,
    }
}

/// 棋子基础分值（厘兵）
pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 0,
    }
}

/// 静态评估：在深度截断的非终局局面上打分
pub trait StaticEvaluator<S: GameState> {
    /// 从 `perspective` 一方的视角评估，正值对其有利
    fn evaluate(&self, state: &S, perspective: Side) -> f64;
}

/// 棋子位置分值表（白方视角，黑方需要镜像）
/// 索引为 rank * 8 + file
mod position_tables {
    /// 马：越靠中心越好
    pub const KNIGHT: [i32; 64] = [
        0, 1, 2, 2, 2, 2, 1, 0,
        1, 2, 3, 3, 3, 3, 2, 1,
        2, 3, 4, 4, 4, 4, 3, 2,
        2, 3, 4, 5, 5, 4, 3, 2,
        2, 3, 4, 5, 5, 4, 3, 2,
        2, 3, 4, 4, 4, 4, 3, 2,
        1, 2, 3, 3, 3, 3, 2, 1,
        0, 1, 2, 2, 2, 2, 1, 0,
    ];

    /// 象：中心和长对角线
    pub const BISHOP: [i32; 64] = [
        0, 0, 1, 1, 1, 1, 0, 0,
        0, 2, 1, 2, 2, 1, 2, 0,
        1, 1, 2, 2, 2, 2, 1, 1,
        1, 2, 2, 3, 3, 2, 2, 1,
        1, 2, 2, 3, 3, 2, 2, 1,
        1, 1, 2, 2, 2, 2, 1, 1,
        0, 1, 1, 1, 1, 1, 1, 0,
        0, 0, 1, 1, 1, 1, 0, 0,
    ];

    /// 后：轻微的中心倾向
    pub const QUEEN: [i32; 64] = [
        0, 0, 0, 1, 1, 0, 0, 0,
        0, 1, 1, 1, 1, 1, 1, 0,
        0, 1, 2, 2, 2, 2, 1, 0,
        1, 1, 2, 2, 2, 2, 1, 1,
        1, 1, 2, 2, 2, 2, 1, 1,
        0, 1, 2, 2, 2, 2, 1, 0,
        0, 1, 1, 1, 1, 1, 1, 0,
        0, 0, 0, 1, 1, 0, 0, 0,
    ];

    /// 车：第七行
    pub const ROOK: [i32; 64] = [
        0, 0, 0, 1, 1, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        2, 2, 2, 2, 2, 2, 2, 2,
        0, 0, 0, 0, 0, 0, 0, 0,
    ];

    /// 兵：越往前越好，中心兵额外加分
    pub const PAWN: [i32; 64] = [
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        1, 1, 1, 2, 2, 1, 1, 1,
        2, 2, 2, 3, 3, 2, 2, 2,
        3, 3, 3, 4, 4, 3, 3, 3,
        4, 4, 4, 5, 5, 4, 4, 4,
        6, 6, 6, 6, 6, 6, 6, 6,
        0, 0, 0, 0, 0, 0, 0, 0, // 不可能到达
    ];
}

/// 各项评估分（白方视角）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvaluationBreakdown {
    pub material: f64,
    pub mobility: f64,
    pub placement: f64,
    pub king_safety: f64,
    pub pawn_structure: f64,
}

impl EvaluationBreakdown {
    /// 非子力项之和
    pub fn heuristic(&self) -> f64 {
        self.mobility + self.placement + self.king_safety + self.pawn_structure
    }

    /// 总分
    pub fn total(&self) -> f64 {
        self.material + self.heuristic()
    }
}

/// 国际象棋评估器
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessEvaluator;

impl ChessEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// 评估局面（白方视角，正值对白方有利）
    pub fn evaluate_white(position: &ChessPosition) -> f64 {
        Self::breakdown(position).total()
    }

    /// 分项评估（白方视角）
    pub fn breakdown(position: &ChessPosition) -> EvaluationBreakdown {
        let board = position.board();
        EvaluationBreakdown {
            material: Self::evaluate_material(board) as f64,
            mobility: Self::mobility(position),
            placement: Self::placement(board),
            king_safety: Self::king_safety(board),
            pawn_structure: Self::pawn_structure(board),
        }
    }

    /// 快速评估（仅计算子力差）
    pub fn evaluate_material(board: &Board) -> i32 {
        let mut score = 0;
        for piece in [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
            let white = board.colored_pieces(Color::White, piece).len() as i32;
            let black = board.colored_pieces(Color::Black, piece).len() as i32;
            score += (white - black) * piece_value(piece);
        }
        score
    }

    /// 当前走子方的合法走法数，归到走子方名下
    fn mobility(position: &ChessPosition) -> f64 {
        let raw = (position.mobility() as f64 * MOBILITY_WEIGHT).min(MOBILITY_CAP);
        match position.side_to_move() {
            Side::White => raw,
            Side::Black => -raw,
        }
    }

    fn placement(board: &Board) -> f64 {
        let score =
            Self::placement_for(board, Color::White) - Self::placement_for(board, Color::Black);
        (score as f64).clamp(-PLACEMENT_CAP, PLACEMENT_CAP)
    }

    fn placement_for(board: &Board, color: Color) -> i32 {
        let mut score = 0;
        for (piece, table) in [
            (Piece::Pawn, &position_tables::PAWN),
            (Piece::Knight, &position_tables::KNIGHT),
            (Piece::Bishop, &position_tables::BISHOP),
            (Piece::Rook, &position_tables::ROOK),
            (Piece::Queen, &position_tables::QUEEN),
        ] {
            for square in board.colored_pieces(color, piece) {
                score += table[table_index(square, color)];
            }
        }
        score
    }

    fn king_safety(board: &Board) -> f64 {
        let score =
            Self::king_safety_for(board, Color::White) - Self::king_safety_for(board, Color::Black);
        score.clamp(-KING_SAFETY_CAP, KING_SAFETY_CAP)
    }

    /// 王在底线 g 列且 f 列有己方车，或在 c 列且 d 列有己方车，视为已易位
    fn king_safety_for(board: &Board, color: Color) -> f64 {
        let king = board.king(color);
        let home = match color {
            Color::White => Rank::First,
            Color::Black => Rank::Eighth,
        };
        let rook_file = match king.file() {
            File::G => Some(File::F),
            File::C => Some(File::D),
            _ => None,
        };
        let castled = king.rank() == home
            && rook_file.is_some_and(|file| {
                board
                    .colored_pieces(color, Piece::Rook)
                    .has(Square::new(file, home))
            });
        if castled {
            return CASTLED_BONUS;
        }
        let rights = board.castle_rights(color);
        if rights.short.is_some() || rights.long.is_some() {
            CASTLING_RIGHTS_BONUS
        } else {
            0.0
        }
    }

    fn pawn_structure(board: &Board) -> f64 {
        let score = Self::pawn_structure_for(board, Color::White)
            - Self::pawn_structure_for(board, Color::Black);
        score.clamp(-PAWN_STRUCTURE_CAP, PAWN_STRUCTURE_CAP)
    }

    fn pawn_structure_for(board: &Board, color: Color) -> f64 {
        let pawns = board.colored_pieces(color, Piece::Pawn);
        let mut per_file = [0u32; 8];
        for square in pawns {
            per_file[square.file() as usize] += 1;
        }
        let doubled = per_file.iter().filter(|&&count| count > 1).count();
        pawns.len() as f64 * PAWN_COUNT_BONUS - doubled as f64 * DOUBLED_PAWN_PENALTY
    }
}

impl StaticEvaluator<ChessPosition> for ChessEvaluator {
    fn evaluate(&self, state: &ChessPosition, perspective: Side) -> f64 {
        let score = Self::evaluate_white(state);
        // 根据视角调整符号
        match perspective {
            Side::White => score,
            Side::Black => -score,
        }
    }
}

/// 位置表索引（黑方沿行镜像）
fn table_index(square: Square, color: Color) -> usize {
    let rank = square.rank() as usize;
    let file = square.file() as usize;
    match color {
        Color::White => rank * 8 + file,
        Color::Black => (7 - rank) * 8 + file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Fen;

    fn eval(fen: &str) -> f64 {
        ChessEvaluator::evaluate_white(&Fen::parse(fen).unwrap())
    }

    fn breakdown(fen: &str) -> EvaluationBreakdown {
        ChessEvaluator::breakdown(&Fen::parse(fen).unwrap())
    }

    #[test]
    fn test_initial_evaluation() {
        let position = ChessPosition::initial();
        let breakdown = ChessEvaluator::breakdown(&position);
        // 初始局面只有走子方的机动性差异
        assert_eq!(breakdown.material, 0.0);
        assert_eq!(breakdown.placement, 0.0);
        assert_eq!(breakdown.king_safety, 0.0);
        assert_eq!(breakdown.pawn_structure, 0.0);
        assert!(breakdown.total().abs() < 10.0, "初始局面应该平衡: {}", breakdown.total());
    }

    #[test]
    fn test_piece_values() {
        assert_eq!(piece_value(Piece::Pawn), 100);
        assert_eq!(piece_value(Piece::Knight), 320);
        assert_eq!(piece_value(Piece::Bishop), 330);
        assert_eq!(piece_value(Piece::Rook), 500);
        assert_eq!(piece_value(Piece::Queen), 900);
        assert_eq!(piece_value(Piece::King), 0);
    }

    #[test]
    fn test_material_dominates_heuristics() {
        assert!(HEURISTIC_BOUND < piece_value(Piece::Pawn) as f64);
        assert!(WIN_SCORE > 10.0 * 2.0 * piece_value(Piece::Queen) as f64 + HEURISTIC_BOUND);
    }

    #[test]
    fn test_material_advantage() {
        // 白方少一个车
        let position =
            Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1 w Qkq - 0 1").unwrap();
        let score = ChessEvaluator::evaluate_material(position.board());
        assert_eq!(score, -500);
        assert!(ChessEvaluator::evaluate_white(&position) < -400.0);
    }

    #[test]
    fn test_heuristic_terms_are_bounded() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "k7/pp6/8/8/8/8/QQQQQQQQ/Q6K w - - 0 1",
            "4k3/8/8/8/8/PPPP4/PPPP4/4K3 w - - 0 1",
            "r1bq1rk1/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1 w - - 6 6",
        ] {
            let position = Fen::parse(fen).unwrap();
            let breakdown = ChessEvaluator::breakdown(&position);
            assert!(
                breakdown.heuristic().abs() <= HEURISTIC_BOUND,
                "非子力项超出上限 {}: {:?}",
                fen,
                breakdown
            );
        }
    }

    #[test]
    fn test_pawn_advancement() {
        // 前进的兵比原位兵分数高
        let advanced = eval("4k3/8/4P3/8/8/8/8/4K3 b - - 0 1");
        let home = eval("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1");
        assert!(advanced > home, "前进兵应该价值更高: {} vs {}", advanced, home);
    }

    #[test]
    fn test_knight_centralization() {
        // 中心马比边角马分数高
        let center = breakdown("4k3/8/8/8/3N4/8/8/4K3 b - - 0 1");
        let corner = breakdown("4k3/8/8/8/8/8/8/N3K3 b - - 0 1");
        assert!(center.placement > corner.placement);
    }

    #[test]
    fn test_black_mirror() {
        // 对称位置的兵，位置分应该抵消
        let position = Fen::parse("4k3/8/8/4p3/4P3/8/8/4K3 w - - 0 1").unwrap();
        let breakdown = ChessEvaluator::breakdown(&position);
        assert_eq!(breakdown.placement, 0.0);
        assert_eq!(breakdown.pawn_structure, 0.0);
    }

    #[test]
    fn test_doubled_pawns_penalized() {
        let healthy = breakdown("4k3/8/8/8/8/8/3PP3/4K3 w - - 0 1");
        let doubled = breakdown("4k3/8/8/8/8/4P3/4P3/4K3 w - - 0 1");
        assert_eq!(healthy.pawn_structure, 2.0);
        assert_eq!(doubled.pawn_structure, 2.0 - DOUBLED_PAWN_PENALTY);
    }

    #[test]
    fn test_king_safety() {
        // 白王已易位，黑王保留易位权
        let short = breakdown("r3k2r/8/8/8/8/8/8/R4RK1 w kq - 0 1");
        assert_eq!(short.king_safety, CASTLED_BONUS - CASTLING_RIGHTS_BONUS);

        // 长易位
        assert_eq!(breakdown("2kr3r/8/8/8/8/8/8/R3K2R w - - 0 1").king_safety, -CASTLED_BONUS);

        // 双方都没有易位权也没易位
        assert_eq!(breakdown("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").king_safety, 0.0);
    }

    #[test]
    fn test_king_walk_is_not_castling() {
        // 王自己走到 g1，f1 没有车
        let walked = breakdown("r3k2r/8/8/8/8/8/8/R5K1 w kq - 0 1");
        assert_eq!(walked.king_safety, -CASTLING_RIGHTS_BONUS);

        // 王在 b1 不算易位
        let corner = breakdown("r3k2r/8/8/8/8/8/8/1K5R w kq - 0 1");
        assert_eq!(corner.king_safety, -CASTLING_RIGHTS_BONUS);
    }

    #[test]
    fn test_perspective_negation() {
        let position = Fen::parse("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let evaluator = ChessEvaluator::new();
        let white = evaluator.evaluate(&position, Side::White);
        let black = evaluator.evaluate(&position, Side::Black);
        assert!(white > 400.0);
        assert_eq!(white, -black);
    }

    #[test]
    fn test_terminal_scores() {
        assert_eq!(terminal_score(Outcome::Win), WIN_SCORE);
        assert_eq!(terminal_score(Outcome::Draw), DRAW_SCORE);
        assert_eq!(terminal_score(Outcome::Loss), LOSS_SCORE);
    }
}
