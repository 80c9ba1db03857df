//! 多局统计
//!
//! 自对弈和两个玩家的对比赛，汇总胜负、和棋、对局长度和用时

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use chess_ai::OpeningBook;
use chrono::{DateTime, Utc};
use protocol::{ChessPosition, GameResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::{ChessMatch, MatchOutcome, DEFAULT_MAX_PLIES};
use crate::player::PlayerSpec;
use crate::storage::StorageManager;

/// 自对弈报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfPlayReport {
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub seed: u64,
    pub total_games: usize,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
    pub forfeits: usize,
    pub white_win_rate: f64,
    pub avg_move_count: f64,
    pub std_move_count: f64,
    pub total_time_s: f64,
    pub avg_time_per_game_s: f64,
}

/// 对比赛报告，胜负都以 A 为准
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub agent_a: String,
    pub agent_b: String,
    pub timestamp: DateTime<Utc>,
    pub seed: u64,
    pub swap_colors: bool,
    pub total_games: usize,
    pub a_wins: usize,
    pub b_wins: usize,
    pub draws: usize,
    pub a_wins_as_white: usize,
    pub a_wins_as_black: usize,
    pub a_win_rate: f64,
    /// 和棋按半分计
    pub a_score: f64,
    pub avg_move_count: f64,
    pub std_move_count: f64,
    pub total_time_s: f64,
    pub avg_time_per_game_s: f64,
}

/// 平均值，空序列为 0
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 样本标准差，少于两个样本为 0
pub fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// 对弈场：按玩家描述构造策略并连续下多局
pub struct Arena {
    book: Arc<OpeningBook<ChessPosition>>,
    max_plies: usize,
    seed: u64,
    storage: Option<StorageManager>,
}

impl Arena {
    /// `seed` 为 None 时随机取一个并记入报告，以便复现
    pub fn new(book: Arc<OpeningBook<ChessPosition>>, seed: Option<u64>) -> Self {
        Self {
            book,
            max_plies: DEFAULT_MAX_PLIES,
            seed: seed.unwrap_or_else(rand::random),
            storage: None,
        }
    }

    pub fn with_max_plies(mut self, max_plies: usize) -> Self {
        self.max_plies = max_plies;
        self
    }

    /// 每局结束后保存棋谱
    pub fn with_storage(mut self, storage: StorageManager) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn storage(&self) -> Option<&StorageManager> {
        self.storage.as_ref()
    }

    /// 第 `index` 局某一方的种子
    fn player_seed(&self, index: usize, white: bool) -> u64 {
        let slot = index as u64 * 2 + u64::from(!white);
        self.seed.wrapping_add(slot.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// 下一局
    pub fn play_game(
        &self,
        white: &PlayerSpec,
        black: &PlayerSpec,
        index: usize,
    ) -> Result<MatchOutcome> {
        let white_strategy = white.build(Some(self.player_seed(index, true)), &self.book);
        let black_strategy = black.build(Some(self.player_seed(index, false)), &self.book);
        let outcome = ChessMatch::new(white_strategy, black_strategy)
            .with_max_plies(self.max_plies)
            .play();

        if let Some(storage) = &self.storage {
            let game_id = storage.save_game(&outcome.record)?;
            info!(game_id = %game_id, "game saved");
        }
        Ok(outcome)
    }

    /// 自对弈
    pub fn self_play(&self, spec: &PlayerSpec, games: usize) -> Result<SelfPlayReport> {
        if games == 0 {
            bail!("self-play needs at least one game");
        }

        let started = Instant::now();
        let mut outcomes = Vec::with_capacity(games);
        for index in 0..games {
            let outcome = self.play_game(spec, spec, index)?;
            info!(
                game = index + 1,
                result = ?outcome.result,
                plies = outcome.plies,
                "self-play game finished"
            );
            outcomes.push(outcome);
        }
        let total_time_s = started.elapsed().as_secs_f64();

        let count = |result: GameResult| outcomes.iter().filter(|o| o.result == result).count();
        let white_wins = count(GameResult::WhiteWin);
        let lengths: Vec<f64> = outcomes.iter().map(|o| o.plies as f64).collect();

        Ok(SelfPlayReport {
            agent: spec.to_string(),
            timestamp: Utc::now(),
            seed: self.seed,
            total_games: games,
            white_wins,
            black_wins: count(GameResult::BlackWin),
            draws: count(GameResult::Draw),
            forfeits: outcomes
                .iter()
                .filter(|o| o.reason == protocol::EndReason::Forfeit)
                .count(),
            white_win_rate: white_wins as f64 / games as f64,
            avg_move_count: mean(&lengths),
            std_move_count: sample_stdev(&lengths),
            total_time_s,
            avg_time_per_game_s: total_time_s / games as f64,
        })
    }

    /// 对比赛：A 先执白下 `games` 局，`swap_colors` 时再执黑下 `games` 局
    pub fn compare(
        &self,
        a: &PlayerSpec,
        b: &PlayerSpec,
        games: usize,
        swap_colors: bool,
    ) -> Result<ComparisonReport> {
        if games == 0 {
            bail!("comparison needs at least one game per color");
        }

        let started = Instant::now();
        let mut tally = Tally::default();
        let rounds: &[bool] = if swap_colors { &[true, false] } else { &[true] };

        let mut index = 0;
        for &a_is_white in rounds {
            for _ in 0..games {
                let outcome = if a_is_white {
                    self.play_game(a, b, index)?
                } else {
                    self.play_game(b, a, index)?
                };
                info!(
                    game = index + 1,
                    a_is_white,
                    result = ?outcome.result,
                    plies = outcome.plies,
                    "comparison game finished"
                );
                tally.add(&outcome, a_is_white);
                index += 1;
            }
        }
        let total_time_s = started.elapsed().as_secs_f64();
        let total_games = index;

        Ok(ComparisonReport {
            agent_a: a.to_string(),
            agent_b: b.to_string(),
            timestamp: Utc::now(),
            seed: self.seed,
            swap_colors,
            total_games,
            a_wins: tally.a_wins_as_white + tally.a_wins_as_black,
            b_wins: tally.b_wins,
            draws: tally.draws,
            a_wins_as_white: tally.a_wins_as_white,
            a_wins_as_black: tally.a_wins_as_black,
            a_win_rate: (tally.a_wins_as_white + tally.a_wins_as_black) as f64
                / total_games as f64,
            a_score: tally.a_score(),
            avg_move_count: mean(&tally.lengths),
            std_move_count: sample_stdev(&tally.lengths),
            total_time_s,
            avg_time_per_game_s: total_time_s / total_games as f64,
        })
    }
}

/// 对比赛的累计
#[derive(Debug, Default)]
struct Tally {
    a_wins_as_white: usize,
    a_wins_as_black: usize,
    b_wins: usize,
    draws: usize,
    lengths: Vec<f64>,
}

impl Tally {
    fn add(&mut self, outcome: &MatchOutcome, a_is_white: bool) {
        // 换算成 A 执白时的结果
        let result = if a_is_white {
            outcome.result
        } else {
            outcome.result.flipped()
        };
        match result {
            GameResult::WhiteWin if a_is_white => self.a_wins_as_white += 1,
            GameResult::WhiteWin => self.a_wins_as_black += 1,
            GameResult::BlackWin => self.b_wins += 1,
            GameResult::Draw => self.draws += 1,
        }
        self.lengths.push(outcome.plies as f64);
    }

    fn a_score(&self) -> f64 {
        (self.a_wins_as_white + self.a_wins_as_black) as f64 + self.draws as f64 * 0.5
    }
}
