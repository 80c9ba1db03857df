//! 搜索错误

use protocol::{GameState, RulesError};
use thiserror::Error;

/// 搜索与策略错误
///
/// 都只影响当前这一次调用：搜索树不跨调用复用，失败后不会留下可被下次调用看到的状态。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// 规则引擎拒绝（走法与局面不同步等），原样向上传递
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// 在终局局面上请求走法
    #[error("No legal action at terminal position {position}")]
    NoLegalAction { position: String },

    /// 没有设置（或同时设置了）时间和迭代次数预算
    #[error("Search budget misconfigured: {reason}")]
    BudgetMisconfigured { reason: String },

    /// 人类输入在给出走法之前结束
    #[error("Input closed before an action was chosen")]
    InputAborted,

    /// 输入通道读写失败
    #[error("Input error: {0}")]
    Input(String),
}

impl SearchError {
    /// 终局局面上的请求
    pub fn no_legal_action<S: GameState>(state: &S) -> Self {
        SearchError::NoLegalAction {
            position: state.to_string(),
        }
    }

    /// 走法不属于该局面
    pub fn illegal_action<S: GameState>(state: &S, action: S::Action) -> Self {
        SearchError::Rules(RulesError::IllegalAction {
            action: action.to_string(),
            position: state.to_string(),
        })
    }
}
