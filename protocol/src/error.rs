//! 错误类型定义

use thiserror::Error;

/// 规则引擎错误
///
/// 每个变体都带上出错的局面（FEN）或走法文本，方便定位规则引擎与搜索核心之间的契约不一致。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RulesError {
    /// 走法在该局面下不合法
    #[error("Illegal action {action} at position {position}")]
    IllegalAction { action: String, position: String },

    /// 局面尚未结束，没有对局结果
    #[error("Position is not terminal: {position}")]
    NotTerminal { position: String },

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 无法识别的走法记号
    #[error("Invalid notation {notation} at position {position}")]
    InvalidNotation { notation: String, position: String },
}

/// 规则层的 Result 类型别名
pub type Result<T> = std::result::Result<T, RulesError>;
