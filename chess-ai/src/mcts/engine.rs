//! MCTS 引擎
//!
//! 选择 / 扩展 / 模拟 / 回传，直到预算耗尽；最终返回根节点访问次数最多的走法。
//! 奖励始终以根节点走子方为准：胜 1.0，和 0.5，负 0.0。

use std::time::{Duration, Instant};

use protocol::{GameState, Side};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tree::SearchTree;
use crate::error::SearchError;
use crate::stats::{MctsStats, SearchSource};

/// MCTS 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MctsConfig {
    /// 时间预算（毫秒）
    pub time_limit_ms: Option<u64>,
    /// 迭代次数预算
    pub iteration_limit: Option<u32>,
    /// 探索常数 C
    pub exploration: f64,
    /// 对手走子的节点上按对手利益选择
    pub adversarial_selection: bool,
    /// 随机种子（None 时每次搜索重新取）
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: None,
            iteration_limit: None,
            exploration: std::f64::consts::SQRT_2,
            adversarial_selection: true,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// 固定迭代次数
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iteration_limit: Some(iterations),
            ..Self::default()
        }
    }

    /// 固定时间（毫秒）
    pub fn with_time_limit(ms: u64) -> Self {
        Self {
            time_limit_ms: Some(ms),
            ..Self::default()
        }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 校验预算：时间和迭代次数恰好设置一个且不为零
    pub fn budget(&self) -> Result<SearchBudget, SearchError> {
        match (self.time_limit_ms, self.iteration_limit) {
            (None, None) => Err(SearchError::BudgetMisconfigured {
                reason: "neither time_limit_ms nor iteration_limit is set".to_string(),
            }),
            (Some(_), Some(_)) => Err(SearchError::BudgetMisconfigured {
                reason: "time_limit_ms and iteration_limit are mutually exclusive".to_string(),
            }),
            (Some(0), None) => Err(SearchError::BudgetMisconfigured {
                reason: "time_limit_ms must be positive".to_string(),
            }),
            (None, Some(0)) => Err(SearchError::BudgetMisconfigured {
                reason: "iteration_limit must be positive".to_string(),
            }),
            (Some(ms), None) => Ok(SearchBudget::Time(Duration::from_millis(ms))),
            (None, Some(n)) => Ok(SearchBudget::Iterations(n)),
        }
    }
}

/// 搜索预算，在每次迭代开始前检查
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBudget {
    Time(Duration),
    Iterations(u32),
}

impl SearchBudget {
    fn exhausted(&self, started: Instant, iterations: u32) -> bool {
        match *self {
            SearchBudget::Time(limit) => started.elapsed() >= limit,
            SearchBudget::Iterations(limit) => iterations >= limit,
        }
    }
}

/// 搜索结果
#[derive(Debug, Clone, PartialEq)]
pub struct MctsResult<A> {
    pub action: A,
    pub stats: MctsStats,
}

/// MCTS 引擎
#[derive(Debug, Clone)]
pub struct MctsEngine {
    config: MctsConfig,
}

impl MctsEngine {
    pub fn new(config: MctsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// 搜索最佳走法
    pub fn search<S: GameState>(&self, root: &S) -> Result<MctsResult<S::Action>, SearchError> {
        let budget = self.config.budget()?;

        if root.is_terminal() {
            return Err(SearchError::no_legal_action(root));
        }
        let actions = root.legal_actions();
        match actions.len() {
            0 => return Err(SearchError::no_legal_action(root)),
            1 => {
                return Ok(MctsResult {
                    action: actions[0],
                    stats: MctsStats::forced(),
                })
            }
            _ => {}
        }

        let started = Instant::now();
        let (tree, iterations) = self.grow_tree(root, budget, started)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (action, _) = tree
            .best_action()
            .ok_or_else(|| SearchError::no_legal_action(root))?;

        let stats = MctsStats {
            iterations,
            root_visits: tree.root().visit_count,
            child_count: tree.root().children.len(),
            tree_size: tree.len(),
            elapsed_ms,
            source: SearchSource::Search,
        };
        debug!(
            action = %action,
            iterations = stats.iterations,
            root_visits = stats.root_visits,
            tree_size = stats.tree_size,
            elapsed_ms = stats.elapsed_ms,
            "mcts search finished"
        );

        Ok(MctsResult { action, stats })
    }

    /// 反复迭代直到预算耗尽，返回树和迭代次数
    fn grow_tree<S: GameState>(
        &self,
        root: &S,
        budget: SearchBudget,
        started: Instant,
    ) -> Result<(SearchTree<S>, u32), SearchError> {
        let mut rng = self.rng();
        let mut tree = SearchTree::new(root.clone());
        let root_side = tree.root_side();
        let mut iterations = 0u32;

        while !budget.exhausted(started, iterations) {
            let selected = tree.select(self.config.exploration, self.config.adversarial_selection);
            let working = tree.expand(selected, &mut rng)?;
            let reward = simulate(&tree.node(working).position, root_side, &mut rng)?;
            tree.backpropagate(working, reward);
            iterations += 1;
        }

        Ok((tree, iterations))
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::seed_from_u64(rand::random()),
        }
    }
}

/// 随机对局到终局，返回根方视角的奖励
///
/// 在局面副本上进行，不触碰树中的节点。
fn simulate<S: GameState, R: Rng>(
    position: &S,
    root_side: Side,
    rng: &mut R,
) -> Result<f64, SearchError> {
    let mut state = position.clone();
    while !state.is_terminal() {
        let actions = state.legal_actions();
        let Some(&action) = actions.choose(rng) else {
            // 非终局却无子可走，按和棋处理
            return Ok(0.5);
        };
        state = state.apply(action)?;
    }
    Ok(state.outcome(root_side)?.reward())
}
