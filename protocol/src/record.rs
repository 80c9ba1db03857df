//! 棋谱记录格式
//!
//! JSON 格式的对局记录，附带每步的思考时间和搜索诊断，供统计汇总使用

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::board::Termination;
use crate::state::Side;

/// 棋谱版本
pub const RECORD_VERSION: &str = "1.0";

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// 白方胜
    WhiteWin,
    /// 黑方胜
    BlackWin,
    /// 和棋
    Draw,
}

impl GameResult {
    /// 由胜方构造，`None` 表示和棋
    pub fn from_winner(winner: Option<Side>) -> Self {
        match winner {
            Some(Side::White) => GameResult::WhiteWin,
            Some(Side::Black) => GameResult::BlackWin,
            None => GameResult::Draw,
        }
    }

    /// 胜方
    pub fn winner(&self) -> Option<Side> {
        match self {
            GameResult::WhiteWin => Some(Side::White),
            GameResult::BlackWin => Some(Side::Black),
            GameResult::Draw => None,
        }
    }

    /// 交换颜色后的结果
    pub fn flipped(&self) -> Self {
        Self::from_winner(self.winner().map(|side| side.opponent()))
    }
}

/// 结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// 规则判定的终局
    Rules(Termination),
    /// 达到步数上限
    MoveLimit,
    /// 一方没有给出合法走法而判负
    Forfeit,
}

/// 游戏元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    /// 白方玩家名
    pub white_player: String,
    /// 黑方玩家名
    pub black_player: String,
    /// 游戏日期
    pub date: String,
    /// 游戏结果
    pub result: Option<GameResult>,
    /// 结束方式
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,
}

/// 走法记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    /// UCI 记号
    pub uci: String,
    /// SAN 记号
    pub san: String,
    /// 思考时间（毫秒）
    pub elapsed_ms: u64,
    /// 搜索诊断（引擎相关的任意结构）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<serde_json::Value>,
}

impl MoveRecord {
    /// 创建新的走法记录
    pub fn new(uci: String, san: String, elapsed_ms: u64) -> Self {
        Self {
            uci,
            san,
            elapsed_ms,
            search: None,
        }
    }

    /// 附带搜索诊断
    pub fn with_search(mut self, search: serde_json::Value) -> Self {
        self.search = Some(search);
        self
    }
}

/// 完整的棋谱记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    /// 版本号
    pub version: String,
    /// 元数据
    pub metadata: GameMetadata,
    /// 初始局面 FEN
    pub initial_fen: String,
    /// 走法列表
    pub moves: Vec<MoveRecord>,
}

impl GameRecord {
    /// 创建新的棋谱记录
    pub fn new(white_player: String, black_player: String) -> Self {
        Self {
            version: RECORD_VERSION.to_string(),
            metadata: GameMetadata {
                white_player,
                black_player,
                date: Utc::now().format("%Y-%m-%d").to_string(),
                result: None,
                end_reason: None,
            },
            initial_fen: crate::fen::INITIAL_FEN.to_string(),
            moves: Vec::new(),
        }
    }

    /// 从自定义 FEN 创建
    pub fn from_fen(white_player: String, black_player: String, fen: String) -> Self {
        let mut record = Self::new(white_player, black_player);
        record.initial_fen = fen;
        record
    }

    /// 添加走法
    pub fn add_move(&mut self, mv: MoveRecord) {
        self.moves.push(mv);
    }

    /// 设置游戏结果
    pub fn set_result(&mut self, result: GameResult, reason: EndReason) {
        self.metadata.result = Some(result);
        self.metadata.end_reason = Some(reason);
    }

    /// 平均思考时间（毫秒）
    pub fn average_move_time_ms(&self) -> f64 {
        if self.moves.is_empty() {
            return 0.0;
        }
        let total: u64 = self.moves.iter().map(|m| m.elapsed_ms).sum();
        total as f64 / self.moves.len() as f64
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 回合制的 SAN 走法串，如 `1. e4 e5 2. Nf3`
    pub fn to_movetext(&self) -> String {
        let mut output = String::new();
        for (i, mv) in self.moves.iter().enumerate() {
            if i % 2 == 0 {
                if i > 0 {
                    output.push(' ');
                }
                output.push_str(&format!("{}. {}", i / 2 + 1, mv.san));
            } else {
                output.push_str(&format!(" {}", mv.san));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_record_json() {
        let mut record = GameRecord::new("MCTS(200)".to_string(), "Random".to_string());
        record.add_move(MoveRecord::new("e2e4".to_string(), "e4".to_string(), 120));
        record.add_move(
            MoveRecord::new("e7e5".to_string(), "e5".to_string(), 1)
                .with_search(serde_json::json!({ "engine": "random" })),
        );
        record.set_result(GameResult::WhiteWin, EndReason::Rules(Termination::Checkmate));

        let json = record.to_json().unwrap();
        let parsed = GameRecord::from_json(&json).unwrap();
        assert_eq!(parsed.metadata.white_player, "MCTS(200)");
        assert_eq!(parsed.moves.len(), 2);
        assert_eq!(parsed.metadata.result, Some(GameResult::WhiteWin));
        assert_eq!(
            parsed.metadata.end_reason,
            Some(EndReason::Rules(Termination::Checkmate))
        );
        assert!(parsed.moves[0].search.is_none());
        assert!(parsed.moves[1].search.is_some());
    }

    #[test]
    fn test_movetext() {
        let mut record = GameRecord::new("a".to_string(), "b".to_string());
        for (uci, san) in [("e2e4", "e4"), ("e7e5", "e5"), ("g1f3", "Nf3")] {
            record.add_move(MoveRecord::new(uci.to_string(), san.to_string(), 0));
        }
        assert_eq!(record.to_movetext(), "1. e4 e5 2. Nf3");
    }

    #[test]
    fn test_result_flip() {
        assert_eq!(GameResult::WhiteWin.flipped(), GameResult::BlackWin);
        assert_eq!(GameResult::Draw.flipped(), GameResult::Draw);
        assert_eq!(GameResult::from_winner(Some(Side::Black)), GameResult::BlackWin);
    }

    #[test]
    fn test_average_move_time() {
        let mut record = GameRecord::new("a".to_string(), "b".to_string());
        assert_eq!(record.average_move_time_ms(), 0.0);
        record.add_move(MoveRecord::new("e2e4".to_string(), "e4".to_string(), 100));
        record.add_move(MoveRecord::new("e7e5".to_string(), "e5".to_string(), 300));
        assert!((record.average_move_time_ms() - 200.0).abs() < f64::EPSILON);
    }
}
