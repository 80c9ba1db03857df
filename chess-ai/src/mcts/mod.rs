//! 蒙特卡洛树搜索 (UCT)

mod engine;
mod node;
mod tree;

pub use engine::{MctsConfig, MctsEngine, MctsResult, SearchBudget};
pub use node::{NodeId, SearchNode};
pub use tree::SearchTree;
