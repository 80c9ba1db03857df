//! 策略抽象
//!
//! 所有决策者共用一个接口：给定局面，返回该局面的一个合法走法。
//! 终局局面上的请求一律报错。

use std::sync::Arc;

use protocol::{GameState, Side};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::error::SearchError;
use crate::evaluate::StaticEvaluator;
use crate::mcts::{MctsConfig, MctsEngine};
use crate::opening::OpeningBook;
use crate::search::{MinimaxConfig, MinimaxEngine};
use crate::stats::Diagnostics;

/// 决策者
pub trait Strategy<S: GameState> {
    /// 显示名称
    fn name(&self) -> String;

    /// 为当前局面选择一个走法
    fn choose_action(&mut self, state: &S) -> Result<S::Action, SearchError>;

    /// 最近一次决策的诊断信息
    fn last_diagnostics(&self) -> Option<&Diagnostics> {
        None
    }
}

fn ensure_playable<S: GameState>(state: &S) -> Result<Vec<S::Action>, SearchError> {
    if state.is_terminal() {
        return Err(SearchError::no_legal_action(state));
    }
    let actions = state.legal_actions();
    if actions.is_empty() {
        return Err(SearchError::no_legal_action(state));
    }
    Ok(actions)
}

/// MCTS 策略
#[derive(Debug, Clone)]
pub struct MctsStrategy {
    engine: MctsEngine,
    last: Option<Diagnostics>,
}

impl MctsStrategy {
    pub fn new(config: MctsConfig) -> Self {
        Self {
            engine: MctsEngine::new(config),
            last: None,
        }
    }
}

impl<S: GameState> Strategy<S> for MctsStrategy {
    fn name(&self) -> String {
        let config = self.engine.config();
        match (config.iteration_limit, config.time_limit_ms) {
            (Some(n), _) => format!("mcts({} iterations)", n),
            (None, Some(ms)) => format!("mcts({}ms)", ms),
            (None, None) => "mcts".to_string(),
        }
    }

    fn choose_action(&mut self, state: &S) -> Result<S::Action, SearchError> {
        self.last = None;
        let result = self.engine.search(state)?;
        self.last = Some(Diagnostics::Mcts(result.stats));
        Ok(result.action)
    }

    fn last_diagnostics(&self) -> Option<&Diagnostics> {
        self.last.as_ref()
    }
}

/// Minimax 策略（可带开局库）
pub struct MinimaxStrategy<S: GameState, E> {
    engine: MinimaxEngine<S, E>,
    last: Option<Diagnostics>,
}

impl<S: GameState, E: StaticEvaluator<S>> MinimaxStrategy<S, E> {
    pub fn new(config: MinimaxConfig, evaluator: E) -> Self {
        Self {
            engine: MinimaxEngine::new(config, evaluator),
            last: None,
        }
    }

    pub fn with_opening_book(mut self, book: Arc<OpeningBook<S>>) -> Self {
        self.engine = self.engine.with_opening_book(book);
        self
    }
}

impl<S: GameState, E: StaticEvaluator<S>> Strategy<S> for MinimaxStrategy<S, E> {
    fn name(&self) -> String {
        let config = self.engine.config();
        if config.use_opening_book {
            format!("minimax(depth {}, book)", config.max_depth)
        } else {
            format!("minimax(depth {})", config.max_depth)
        }
    }

    fn choose_action(&mut self, state: &S) -> Result<S::Action, SearchError> {
        self.last = None;
        let result = self.engine.search(state)?;
        self.last = Some(Diagnostics::Minimax(result.stats));
        Ok(result.action)
    }

    fn last_diagnostics(&self) -> Option<&Diagnostics> {
        self.last.as_ref()
    }
}

/// 均匀随机策略
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    rng: ChaCha8Rng,
}

impl RandomStrategy {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<S: GameState> Strategy<S> for RandomStrategy {
    fn name(&self) -> String {
        "random".to_string()
    }

    fn choose_action(&mut self, state: &S) -> Result<S::Action, SearchError> {
        let actions = ensure_playable(state)?;
        actions
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| SearchError::no_legal_action(state))
    }
}

/// 人类输入的来源
pub trait ActionInput<S: GameState> {
    /// 读取一个走法；输入结束时返回 `Ok(None)`
    fn read_action(&mut self, state: &S, legal: &[S::Action])
        -> Result<Option<S::Action>, SearchError>;
}

/// 人类策略：把决定交给外部输入
pub struct HumanStrategy<I> {
    input: I,
    name: String,
}

impl<I> HumanStrategy<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            name: "human".to_string(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<S: GameState, I: ActionInput<S>> Strategy<S> for HumanStrategy<I> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn choose_action(&mut self, state: &S) -> Result<S::Action, SearchError> {
        let legal = ensure_playable(state)?;
        loop {
            match self.input.read_action(state, &legal)? {
                Some(action) if legal.contains(&action) => return Ok(action),
                Some(action) => warn!(action = %action, "rejected illegal input"),
                None => return Err(SearchError::InputAborted),
            }
        }
    }
}

/// 组合策略：按走子方委托给白方或黑方的策略
pub struct CompositeStrategy<S: GameState + 'static> {
    white: Box<dyn Strategy<S>>,
    black: Box<dyn Strategy<S>>,
    last_side: Option<Side>,
}

impl<S: GameState + 'static> CompositeStrategy<S> {
    pub fn new(white: Box<dyn Strategy<S>>, black: Box<dyn Strategy<S>>) -> Self {
        Self {
            white,
            black,
            last_side: None,
        }
    }

    /// 某一方的策略
    pub fn strategy(&self, side: Side) -> &dyn Strategy<S> {
        match side {
            Side::White => self.white.as_ref(),
            Side::Black => self.black.as_ref(),
        }
    }

    fn strategy_mut(&mut self, side: Side) -> &mut dyn Strategy<S> {
        match side {
            Side::White => self.white.as_mut(),
            Side::Black => self.black.as_mut(),
        }
    }

    /// 交换双方
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.white, &mut self.black);
        self.last_side = None;
    }
}

impl<S: GameState + 'static> Strategy<S> for CompositeStrategy<S> {
    fn name(&self) -> String {
        format!("{} vs {}", self.white.name(), self.black.name())
    }

    fn choose_action(&mut self, state: &S) -> Result<S::Action, SearchError> {
        if state.is_terminal() {
            return Err(SearchError::no_legal_action(state));
        }
        let side = state.side_to_move();
        self.last_side = Some(side);
        self.strategy_mut(side).choose_action(state)
    }

    fn last_diagnostics(&self) -> Option<&Diagnostics> {
        self.last_side
            .and_then(|side| self.strategy(side).last_diagnostics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::ChessEvaluator;
    use crate::stats::SearchSource;
    use crate::testing::{TreeEvaluator, TreeGame};
    use protocol::ChessPosition;
    use std::collections::VecDeque;

    /// 预先写好的输入序列
    struct ScriptedInput {
        actions: VecDeque<u8>,
    }

    impl ActionInput<TreeGame> for ScriptedInput {
        fn read_action(
            &mut self,
            _state: &TreeGame,
            _legal: &[u8],
        ) -> Result<Option<u8>, SearchError> {
            Ok(self.actions.pop_front())
        }
    }

    fn scripted(actions: &[u8]) -> HumanStrategy<ScriptedInput> {
        HumanStrategy::new(ScriptedInput {
            actions: actions.iter().copied().collect(),
        })
    }

    fn fools_mate() -> ChessPosition {
        ChessPosition::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap()
    }

    #[test]
    fn test_every_strategy_rejects_terminal_position() {
        let position = fools_mate();
        let mut strategies: Vec<Box<dyn Strategy<ChessPosition>>> = vec![
            Box::new(MctsStrategy::new(MctsConfig::with_iterations(10).seeded(1))),
            Box::new(MinimaxStrategy::new(MinimaxConfig::new(2), ChessEvaluator::new())),
            Box::new(RandomStrategy::new(Some(1))),
        ];
        for strategy in strategies.iter_mut() {
            let err = strategy.choose_action(&position).unwrap_err();
            assert!(
                matches!(err, SearchError::NoLegalAction { .. }),
                "{} accepted a terminal position",
                strategy.name()
            );
        }

        let leaf = TreeGame::uniform(2, 1).apply(0).unwrap();
        let mut human = scripted(&[0]);
        assert!(matches!(
            human.choose_action(&leaf),
            Err(SearchError::NoLegalAction { .. })
        ));
    }

    #[test]
    fn test_random_strategy_is_legal_and_seeded() {
        let position = ChessPosition::initial();
        let legal = position.legal_actions();
        let mut a = RandomStrategy::new(Some(99));
        let mut b = RandomStrategy::new(Some(99));
        for _ in 0..10 {
            let first = a.choose_action(&position).unwrap();
            let second = b.choose_action(&position).unwrap();
            assert_eq!(first, second);
            assert!(legal.contains(&first));
        }
        assert!(Strategy::<ChessPosition>::last_diagnostics(&a).is_none());
    }

    #[test]
    fn test_human_skips_illegal_input() {
        let game = TreeGame::uniform(3, 2);
        let mut human = scripted(&[7, 2]);
        assert_eq!(human.choose_action(&game).unwrap(), 2);
    }

    #[test]
    fn test_human_aborts_on_end_of_input() {
        let game = TreeGame::uniform(3, 2);
        let mut human = scripted(&[]);
        assert_eq!(
            human.choose_action(&game).unwrap_err(),
            SearchError::InputAborted
        );
    }

    #[test]
    fn test_strategies_record_diagnostics() {
        let position = ChessPosition::initial();

        let mut mcts = MctsStrategy::new(MctsConfig::with_iterations(30).seeded(2));
        Strategy::<ChessPosition>::choose_action(&mut mcts, &position).unwrap();
        match Strategy::<ChessPosition>::last_diagnostics(&mcts) {
            Some(Diagnostics::Mcts(stats)) => assert_eq!(stats.iterations, 30),
            other => panic!("unexpected diagnostics {:?}", other),
        }

        let book = Arc::new(OpeningBook::standard_chess().unwrap());
        let mut config = MinimaxConfig::new(2);
        config.use_opening_book = true;
        let mut minimax =
            MinimaxStrategy::new(config, ChessEvaluator::new()).with_opening_book(book);
        minimax.choose_action(&position).unwrap();
        let diag = minimax.last_diagnostics().unwrap();
        assert_eq!(diag.source(), SearchSource::OpeningBook);
        assert_eq!(minimax.name(), "minimax(depth 2, book)");
    }

    #[test]
    fn test_composite_delegates_by_side() {
        let white = scripted(&[1]).named("alice");
        let black = scripted(&[2]).named("bob");
        let mut composite: CompositeStrategy<TreeGame> =
            CompositeStrategy::new(Box::new(white), Box::new(black));
        assert_eq!(composite.name(), "alice vs bob");

        let game = TreeGame::uniform(3, 4);
        let first = composite.choose_action(&game).unwrap();
        assert_eq!(first, 1);
        let next = game.apply(first).unwrap();
        assert_eq!(next.side_to_move(), Side::Black);
        assert_eq!(composite.choose_action(&next).unwrap(), 2);

        composite.swap();
        assert_eq!(composite.strategy(Side::White).name(), "bob");
    }

    #[test]
    fn test_composite_reports_last_mover_diagnostics() {
        let mut composite: CompositeStrategy<TreeGame> = CompositeStrategy::new(
            Box::new(MinimaxStrategy::new(MinimaxConfig::new(2), TreeEvaluator)),
            Box::new(RandomStrategy::new(Some(5))),
        );
        assert!(composite.last_diagnostics().is_none());

        let game = TreeGame::uniform(3, 4);
        let action = composite.choose_action(&game).unwrap();
        assert!(matches!(
            composite.last_diagnostics(),
            Some(Diagnostics::Minimax(_))
        ));

        let next = game.apply(action).unwrap();
        composite.choose_action(&next).unwrap();
        assert!(composite.last_diagnostics().is_none());
    }
}
