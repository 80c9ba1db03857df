//! 局面接口
//!
//! 搜索核心只依赖这里的契约：合法走法、执行走法、终局判断、终局结果、局面键。

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// 白方（先手）
    White,
    /// 黑方
    Black,
}

impl Side {
    /// 获取对手阵营
    pub fn opponent(&self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// FEN 中的走子方字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// 从某一方视角看到的终局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// 对称的 [0, 1] 奖励：胜 1，和 0.5，负 0
    pub fn reward(&self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Draw => 0.5,
            Outcome::Loss => 0.0,
        }
    }

    /// 换到对手视角
    pub fn flipped(&self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Draw => Outcome::Draw,
            Outcome::Loss => Outcome::Win,
        }
    }
}

/// 双人、完全信息、轮流行棋的局面
///
/// 实现必须满足：`legal_actions` 返回的任一走法都能被 `apply` 接受；
/// 非终局局面至少有一个合法走法；终局局面的 `outcome` 有定义。
pub trait GameState: Clone + Debug + Display {
    /// 单步走法，只在产生它的局面下有意义
    type Action: Copy + Eq + Hash + Debug + Display;
    /// 局面身份键（开局库查询用）
    type Key: Clone + Eq + Hash + Debug;

    /// 当前走子方
    fn side_to_move(&self) -> Side;

    /// 合法走法，顺序必须确定
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// 执行走法得到新局面，走法不合法时返回 `IllegalAction`
    fn apply(&self, action: Self::Action) -> Result<Self>;

    /// 是否终局
    fn is_terminal(&self) -> bool;

    /// 终局结果（`perspective` 视角），非终局时返回 `NotTerminal`
    fn outcome(&self, perspective: Side) -> Result<Outcome>;

    /// 局面键
    fn key(&self) -> Self::Key;
}
