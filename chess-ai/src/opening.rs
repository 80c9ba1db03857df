//! 开局库
//!
//! 局面键 -> 推荐走法 的只读表。显式构造后通过 `Arc` 共享给需要的引擎，没有全局状态。

use std::collections::HashMap;

use protocol::{ChessPosition, GameState, Notation, RulesError};

/// 开局库条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningEntry<A> {
    pub action: A,
    /// 开局名称
    pub name: String,
    /// 走法记号（用于展示）
    pub notation: String,
}

/// 一条命名的开局变化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningLine {
    pub name: String,
    pub moves: Vec<String>,
}

/// 标准国际象棋开局（UCI 记号）
const CHESS_LINES: &[(&str, &[&str])] = &[
    ("Italian Game", &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5"]),
    ("Ruy Lopez", &["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6"]),
    ("French Defense", &["e2e4", "e7e6", "d2d4", "d7d5"]),
    (
        "Sicilian Dragon",
        &["e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6", "b1c3", "g7g6"],
    ),
    ("Caro-Kann Defense", &["e2e4", "c7c6", "d2d4", "d7d5"]),
    ("English Opening", &["c2c4", "e7e5"]),
    ("Queen's Gambit Declined", &["d2d4", "d7d5", "c2c4", "e7e6"]),
    ("Indian Defense", &["d2d4", "g8f6", "c2c4", "e7e6"]),
    ("Scandinavian Defense", &["e2e4", "d7d5", "e4d5", "d8d5"]),
    ("Alekhine's Defense", &["e2e4", "g8f6", "e4e5", "f6d5"]),
];

/// 开局库
#[derive(Debug, Clone)]
pub struct OpeningBook<S: GameState> {
    entries: HashMap<S::Key, OpeningEntry<S::Action>>,
    lines: Vec<OpeningLine>,
}

impl<S: GameState> Default for OpeningBook<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GameState> OpeningBook<S> {
    /// 创建空开局库
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lines: Vec::new(),
        }
    }

    /// 登记一个局面的推荐走法；已有条目时保留先登记的，返回是否写入
    pub fn insert(&mut self, key: S::Key, entry: OpeningEntry<S::Action>) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, entry);
        true
    }

    /// 查询局面
    pub fn lookup(&self, key: &S::Key) -> Option<&OpeningEntry<S::Action>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &S::Key) -> bool {
        self.entries.contains_key(key)
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 收录的开局变化
    pub fn openings(&self) -> &[OpeningLine] {
        &self.lines
    }
}

impl OpeningBook<ChessPosition> {
    /// 标准国际象棋开局库
    ///
    /// 按顺序重放每条变化，每个局面记录下一步；同一局面由先出现的变化决定。
    pub fn standard_chess() -> Result<Self, RulesError> {
        let mut book = Self::new();
        for (name, moves) in CHESS_LINES {
            book.add_line(name, moves)?;
        }
        Ok(book)
    }

    /// 从初始局面重放一条 UCI 变化并登记
    pub fn add_line(&mut self, name: &str, moves: &[&str]) -> Result<(), RulesError> {
        let mut position = ChessPosition::initial();
        let mut sans = Vec::with_capacity(moves.len());
        for uci in moves {
            let mv = position.parse_uci(uci)?;
            let san = Notation::to_san(&position, mv)?;
            self.insert(
                position.key(),
                OpeningEntry {
                    action: mv,
                    name: name.to_string(),
                    notation: san.clone(),
                },
            );
            sans.push(san);
            position = position.apply(mv)?;
        }
        self.lines.push(OpeningLine {
            name: name.to_string(),
            moves: sans,
        });
        Ok(())
    }
}
