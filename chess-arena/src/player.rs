//! 玩家描述
//!
//! 命令行里的 `mcts:200`、`minimax:3`、`random` 等写法解析成 [`PlayerSpec`]，
//! 再按需构造出具体的策略。

use std::fmt;
use std::io::{self, BufReader};
use std::str::FromStr;
use std::sync::Arc;

use chess_ai::{
    ChessEvaluator, Difficulty, HumanStrategy, MctsConfig, MctsStrategy, MinimaxConfig,
    MinimaxStrategy, OpeningBook, RandomStrategy, Strategy,
};
use protocol::ChessPosition;
use thiserror::Error;

use crate::input::ConsoleInput;

/// 默认 MCTS 迭代次数
pub const DEFAULT_MCTS_ITERATIONS: u32 = 200;

/// 玩家描述解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerSpecError {
    #[error("Unknown player kind: {0}")]
    UnknownKind(String),

    #[error("Invalid parameter '{value}' for {kind}: {reason}")]
    InvalidParameter {
        kind: String,
        value: String,
        reason: String,
    },

    #[error("Player kind {0} takes no parameter")]
    UnexpectedParameter(String),
}

/// 玩家描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerSpec {
    /// 固定迭代次数的 MCTS
    Mcts { iterations: u32 },
    /// 固定思考时间的 MCTS
    MctsTime { millis: u64 },
    /// 固定深度的 Minimax
    Minimax { depth: i32 },
    /// 带开局库的 Minimax
    MinimaxBook { depth: i32 },
    /// 难度预设
    Level(Difficulty),
    Random,
    Human,
}

impl PlayerSpec {
    /// 是否需要终端交互
    pub fn is_interactive(&self) -> bool {
        matches!(self, PlayerSpec::Human)
    }

    /// 构造策略
    ///
    /// `seed` 只影响带随机性的策略（MCTS、随机）。
    pub fn build(
        &self,
        seed: Option<u64>,
        book: &Arc<OpeningBook<ChessPosition>>,
    ) -> Box<dyn Strategy<ChessPosition>> {
        match *self {
            PlayerSpec::Mcts { iterations } => {
                Box::new(MctsStrategy::new(seeded(MctsConfig::with_iterations(iterations), seed)))
            }
            PlayerSpec::MctsTime { millis } => {
                Box::new(MctsStrategy::new(seeded(MctsConfig::with_time_limit(millis), seed)))
            }
            PlayerSpec::Minimax { depth } => Box::new(MinimaxStrategy::new(
                MinimaxConfig::new(depth),
                ChessEvaluator::new(),
            )),
            PlayerSpec::MinimaxBook { depth } => {
                let config = MinimaxConfig {
                    max_depth: depth,
                    use_opening_book: true,
                };
                Box::new(
                    MinimaxStrategy::new(config, ChessEvaluator::new())
                        .with_opening_book(book.clone()),
                )
            }
            PlayerSpec::Level(difficulty) => {
                let config = MinimaxConfig::from_difficulty(difficulty);
                Box::new(
                    MinimaxStrategy::new(config, ChessEvaluator::new())
                        .with_opening_book(book.clone()),
                )
            }
            PlayerSpec::Random => Box::new(RandomStrategy::new(seed)),
            PlayerSpec::Human => Box::new(HumanStrategy::new(ConsoleInput::new(
                BufReader::new(io::stdin()),
                io::stdout(),
            ))),
        }
    }
}

fn seeded(config: MctsConfig, seed: Option<u64>) -> MctsConfig {
    match seed {
        Some(seed) => config.seeded(seed),
        None => config,
    }
}

fn parse_param<T: FromStr>(kind: &str, value: &str) -> Result<T, PlayerSpecError>
where
    T::Err: fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| PlayerSpecError::InvalidParameter {
            kind: kind.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn positive<T: PartialOrd + Default + fmt::Display>(
    kind: &str,
    value: T,
) -> Result<T, PlayerSpecError> {
    if value > T::default() {
        Ok(value)
    } else {
        Err(PlayerSpecError::InvalidParameter {
            kind: kind.to_string(),
            value: value.to_string(),
            reason: "must be positive".to_string(),
        })
    }
}

impl FromStr for PlayerSpec {
    type Err = PlayerSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let (kind, param) = match text.split_once(':') {
            Some((kind, param)) => (kind, Some(param)),
            None => (text.as_str(), None),
        };

        let no_param = |spec: PlayerSpec| match param {
            None => Ok(spec),
            Some(_) => Err(PlayerSpecError::UnexpectedParameter(kind.to_string())),
        };

        match kind {
            "mcts" => {
                let iterations = match param {
                    Some(p) => positive(kind, parse_param::<u32>(kind, p)?)?,
                    None => DEFAULT_MCTS_ITERATIONS,
                };
                Ok(PlayerSpec::Mcts { iterations })
            }
            "mcts-time" => {
                let millis = match param {
                    Some(p) => positive(kind, parse_param::<u64>(kind, p)?)?,
                    None => 1000,
                };
                Ok(PlayerSpec::MctsTime { millis })
            }
            "minimax" => {
                let depth = match param {
                    Some(p) => positive(kind, parse_param::<i32>(kind, p)?)?,
                    None => MinimaxConfig::default().max_depth,
                };
                Ok(PlayerSpec::Minimax { depth })
            }
            "minimax-book" => {
                let depth = match param {
                    Some(p) => positive(kind, parse_param::<i32>(kind, p)?)?,
                    None => MinimaxConfig::default().max_depth,
                };
                Ok(PlayerSpec::MinimaxBook { depth })
            }
            "easy" => no_param(PlayerSpec::Level(Difficulty::Easy)),
            "medium" => no_param(PlayerSpec::Level(Difficulty::Medium)),
            "hard" => no_param(PlayerSpec::Level(Difficulty::Hard)),
            "random" => no_param(PlayerSpec::Random),
            "human" => no_param(PlayerSpec::Human),
            other => Err(PlayerSpecError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for PlayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerSpec::Mcts { iterations } => write!(f, "mcts:{}", iterations),
            PlayerSpec::MctsTime { millis } => write!(f, "mcts-time:{}", millis),
            PlayerSpec::Minimax { depth } => write!(f, "minimax:{}", depth),
            PlayerSpec::MinimaxBook { depth } => write!(f, "minimax-book:{}", depth),
            PlayerSpec::Level(Difficulty::Easy) => write!(f, "easy"),
            PlayerSpec::Level(Difficulty::Medium) => write!(f, "medium"),
            PlayerSpec::Level(Difficulty::Hard) => write!(f, "hard"),
            PlayerSpec::Random => write!(f, "random"),
            PlayerSpec::Human => write!(f, "human"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_specs() {
        assert_eq!("mcts:50".parse::<PlayerSpec>(), Ok(PlayerSpec::Mcts { iterations: 50 }));
        assert_eq!(
            "mcts".parse::<PlayerSpec>(),
            Ok(PlayerSpec::Mcts {
                iterations: DEFAULT_MCTS_ITERATIONS
            })
        );
        assert_eq!(
            "MCTS-Time:1500".parse::<PlayerSpec>(),
            Ok(PlayerSpec::MctsTime { millis: 1500 })
        );
        assert_eq!("minimax:3".parse::<PlayerSpec>(), Ok(PlayerSpec::Minimax { depth: 3 }));
        assert_eq!("minimax".parse::<PlayerSpec>(), Ok(PlayerSpec::Minimax { depth: 2 }));
        assert_eq!(
            "minimax-book:2".parse::<PlayerSpec>(),
            Ok(PlayerSpec::MinimaxBook { depth: 2 })
        );
        assert_eq!("hard".parse::<PlayerSpec>(), Ok(PlayerSpec::Level(Difficulty::Hard)));
        assert_eq!(" random ".parse::<PlayerSpec>(), Ok(PlayerSpec::Random));
        assert_eq!("human".parse::<PlayerSpec>(), Ok(PlayerSpec::Human));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "alphazero".parse::<PlayerSpec>(),
            Err(PlayerSpecError::UnknownKind("alphazero".to_string()))
        );
        assert!(matches!(
            "mcts:lots".parse::<PlayerSpec>(),
            Err(PlayerSpecError::InvalidParameter { .. })
        ));
        assert!(matches!(
            "mcts:0".parse::<PlayerSpec>(),
            Err(PlayerSpecError::InvalidParameter { .. })
        ));
        assert!(matches!(
            "minimax:-1".parse::<PlayerSpec>(),
            Err(PlayerSpecError::InvalidParameter { .. })
        ));
        assert_eq!(
            "random:3".parse::<PlayerSpec>(),
            Err(PlayerSpecError::UnexpectedParameter("random".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips() {
        for text in [
            "mcts:200",
            "mcts-time:750",
            "minimax:3",
            "minimax-book:2",
            "easy",
            "random",
            "human",
        ] {
            let spec: PlayerSpec = text.parse().unwrap();
            assert_eq!(spec.to_string(), text);
        }
    }

    #[test]
    fn test_build_strategies() {
        let book = Arc::new(OpeningBook::standard_chess().unwrap());
        let position = ChessPosition::initial();
        let legal = protocol::GameState::legal_actions(&position);

        for text in ["mcts:20", "minimax:1", "minimax-book:2", "hard", "random"] {
            let spec: PlayerSpec = text.parse().unwrap();
            assert!(!spec.is_interactive());
            let mut strategy = spec.build(Some(3), &book);
            let action = strategy.choose_action(&position).unwrap();
            assert!(legal.contains(&action), "{} chose {}", text, action);
        }

        let hard = PlayerSpec::Level(Difficulty::Hard).build(None, &book);
        assert_eq!(hard.name(), "minimax(depth 3, book)");
        assert!(PlayerSpec::Human.is_interactive());
    }
}
