//! 对局控制
//!
//! 包含计时器和单局对弈循环

use std::time::Instant;

use chess_ai::{CompositeStrategy, Strategy};
use protocol::{
    ChessPosition, EndReason, GameRecord, GameResult, GameState, MoveRecord, Notation, Side,
    Termination,
};
use tracing::{debug, info, warn};

/// 默认步数上限（半回合）
pub const DEFAULT_MAX_PLIES: usize = 500;

/// 思考计时器：累计双方各自用掉的时间
#[derive(Debug, Default)]
pub struct MoveClock {
    /// 白方累计用时（毫秒）
    white_ms: u64,
    /// 黑方累计用时（毫秒）
    black_ms: u64,
    /// 当前计时的一方与开始时间
    running: Option<(Side, Instant)>,
}

impl MoveClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始某一方的回合
    pub fn start_turn(&mut self, side: Side) {
        self.running = Some((side, Instant::now()));
    }

    /// 结束当前回合，返回本回合用时（毫秒）
    pub fn finish_turn(&mut self) -> u64 {
        let Some((side, start)) = self.running.take() else {
            return 0;
        };
        let elapsed = start.elapsed().as_millis() as u64;
        match side {
            Side::White => self.white_ms += elapsed,
            Side::Black => self.black_ms += elapsed,
        }
        elapsed
    }

    /// 某一方累计用时（毫秒），不含正在进行的回合
    pub fn total_ms(&self, side: Side) -> u64 {
        match side {
            Side::White => self.white_ms,
            Side::Black => self.black_ms,
        }
    }

    /// 是否在计时
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

/// 单局结果
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub record: GameRecord,
    pub result: GameResult,
    pub reason: EndReason,
    /// 实际走了多少半回合
    pub plies: usize,
    pub final_fen: String,
    pub white_time_ms: u64,
    pub black_time_ms: u64,
    pub duration_ms: u64,
}

/// 一局棋：通过组合策略轮流向双方要走法
pub struct ChessMatch {
    position: ChessPosition,
    players: CompositeStrategy<ChessPosition>,
    max_plies: usize,
    record: GameRecord,
    clock: MoveClock,
}

impl ChessMatch {
    /// 从初始局面开始
    pub fn new(
        white: Box<dyn Strategy<ChessPosition>>,
        black: Box<dyn Strategy<ChessPosition>>,
    ) -> Self {
        Self::from_position(ChessPosition::initial(), white, black)
    }

    /// 从指定局面开始
    pub fn from_position(
        position: ChessPosition,
        white: Box<dyn Strategy<ChessPosition>>,
        black: Box<dyn Strategy<ChessPosition>>,
    ) -> Self {
        let record = GameRecord::from_fen(white.name(), black.name(), position.fen());
        Self {
            position,
            players: CompositeStrategy::new(white, black),
            max_plies: DEFAULT_MAX_PLIES,
            record,
            clock: MoveClock::new(),
        }
    }

    /// 设置步数上限
    pub fn with_max_plies(mut self, max_plies: usize) -> Self {
        self.max_plies = max_plies;
        self
    }

    /// 当前局面
    pub fn position(&self) -> &ChessPosition {
        &self.position
    }

    /// 下完整局
    pub fn play(mut self) -> MatchOutcome {
        let started = Instant::now();
        let mut plies = 0usize;

        let (result, reason) = loop {
            if let Some(termination) = self.position.termination() {
                let winner = match termination {
                    Termination::Checkmate => Some(self.position.side_to_move().opponent()),
                    _ => None,
                };
                break (GameResult::from_winner(winner), EndReason::Rules(termination));
            }
            if plies >= self.max_plies {
                break (GameResult::Draw, EndReason::MoveLimit);
            }

            let side = self.position.side_to_move();
            if let Err(reason) = self.play_turn(side) {
                warn!(side = %side, fen = %self.position, reason = %reason, "forfeit");
                break (GameResult::from_winner(Some(side.opponent())), EndReason::Forfeit);
            }
            plies += 1;
        };

        self.record.set_result(result, reason);
        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            white = %self.record.metadata.white_player,
            black = %self.record.metadata.black_player,
            result = ?result,
            reason = ?reason,
            plies,
            duration_ms,
            "game finished"
        );

        MatchOutcome {
            result,
            reason,
            plies,
            final_fen: self.position.fen(),
            white_time_ms: self.clock.total_ms(Side::White),
            black_time_ms: self.clock.total_ms(Side::Black),
            duration_ms,
            record: self.record,
        }
    }

    /// 走一步；失败时返回判负原因
    fn play_turn(&mut self, side: Side) -> Result<(), String> {
        self.clock.start_turn(side);
        let chosen = self.players.choose_action(&self.position);
        let elapsed_ms = self.clock.finish_turn();

        let mv = chosen.map_err(|e| e.to_string())?;
        let san = Notation::to_san(&self.position, mv).map_err(|e| e.to_string())?;
        let next = self.position.apply(mv).map_err(|e| e.to_string())?;

        let mut entry = MoveRecord::new(Notation::to_uci(&self.position, mv), san, elapsed_ms);
        if let Some(diagnostics) = self.players.last_diagnostics() {
            match serde_json::to_value(diagnostics) {
                Ok(value) => entry = entry.with_search(value),
                Err(e) => debug!(error = %e, "diagnostics not recorded"),
            }
        }
        debug!(side = %side, uci = %entry.uci, san = %entry.san, elapsed_ms, "move played");

        self.record.add_move(entry);
        self.position = next;
        Ok(())
    }
}
