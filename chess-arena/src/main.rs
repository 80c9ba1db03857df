use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chess_ai::OpeningBook;
use chess_arena::{
    render_board, Arena, ChessMatch, PlayerSpec, StorageManager, DEFAULT_MAX_PLIES,
};
use clap::{Parser, Subcommand};
use protocol::{ChessPosition, Fen};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 棋类搜索引擎对弈场
#[derive(Parser)]
#[command(name = "chess-arena")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 随机种子（不指定时随机生成并写入报告）
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// 棋谱和报告的输出目录
    #[arg(long, global = true, default_value = "data")]
    output_dir: PathBuf,

    /// 不保存棋谱和报告
    #[arg(long, global = true)]
    no_save: bool,

    /// 每局步数上限（半回合）
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_PLIES)]
    max_moves: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// 下一局（默认人类执白对 MCTS）
    Play {
        #[arg(long, default_value = "human")]
        white: PlayerSpec,
        #[arg(long, default_value = "mcts:200")]
        black: PlayerSpec,
        /// 起始局面
        #[arg(long)]
        fen: Option<String>,
    },
    /// 同一个玩家自对弈
    SelfPlay {
        #[arg(default_value = "mcts:100")]
        agent: PlayerSpec,
        #[arg(long, default_value_t = 10)]
        games: usize,
    },
    /// 两个玩家对比赛
    Compare {
        agent_a: PlayerSpec,
        agent_b: PlayerSpec,
        /// 每种颜色的局数
        #[arg(long, default_value_t = 10)]
        games: usize,
        /// 不交换颜色
        #[arg(long)]
        no_swap: bool,
    },
    /// 列出开局库
    Openings,
    /// 列出保存的棋局
    Games,
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_arena=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let book = Arc::new(
        OpeningBook::standard_chess().context("Failed to build opening book")?,
    );
    let storage = if cli.no_save {
        None
    } else {
        Some(StorageManager::new(&cli.output_dir)?)
    };

    match cli.command {
        Commands::Play { white, black, fen } => {
            let position = match fen {
                Some(fen) => Fen::parse(&fen)?,
                None => ChessPosition::initial(),
            };
            let seed = cli.seed.unwrap_or_else(rand::random);
            info!(white = %white, black = %black, seed, "starting game");

            let white_strategy = white.build(Some(seed), &book);
            let black_strategy = black.build(Some(seed.wrapping_add(1)), &book);
            let outcome = ChessMatch::from_position(position, white_strategy, black_strategy)
                .with_max_plies(cli.max_moves)
                .play();

            println!();
            print!("{}", render_board(&ChessPosition::from_fen(&outcome.final_fen)?));
            println!("{}", outcome.record.to_movetext());
            println!(
                "Result: {:?} ({:?}) after {} plies",
                outcome.result, outcome.reason, outcome.plies
            );
            println!(
                "Think time: white {}ms, black {}ms",
                outcome.white_time_ms, outcome.black_time_ms
            );
            if let Some(storage) = &storage {
                let game_id = storage.save_game(&outcome.record)?;
                println!("Saved {}", storage.saves_directory().join(game_id).display());
            }
        }
        Commands::SelfPlay { agent, games } => {
            let mut arena = Arena::new(book, cli.seed).with_max_plies(cli.max_moves);
            if let Some(storage) = storage {
                arena = arena.with_storage(storage);
            }
            let report = arena.self_play(&agent, games)?;

            println!(
                "Self-play: {} ({} games, seed {})",
                report.agent, report.total_games, report.seed
            );
            println!("  White wins: {}", report.white_wins);
            println!("  Black wins: {}", report.black_wins);
            println!("  Draws: {}", report.draws);
            println!(
                "  Average plies: {:.1} (stdev {:.1})",
                report.avg_move_count, report.std_move_count
            );
            println!("  Total time: {:.1}s", report.total_time_s);
            if let Some(storage) = arena.storage() {
                let path = storage.save_report("self_play", &report)?;
                println!("Report saved to {}", path.display());
            }
        }
        Commands::Compare {
            agent_a,
            agent_b,
            games,
            no_swap,
        } => {
            let mut arena = Arena::new(book, cli.seed).with_max_plies(cli.max_moves);
            if let Some(storage) = storage {
                arena = arena.with_storage(storage);
            }
            let report = arena.compare(&agent_a, &agent_b, games, !no_swap)?;

            println!(
                "Comparison: {} vs {} ({} games, seed {})",
                report.agent_a, report.agent_b, report.total_games, report.seed
            );
            println!(
                "  {}: {} wins ({:.1}%), {} as white, {} as black",
                report.agent_a,
                report.a_wins,
                report.a_win_rate * 100.0,
                report.a_wins_as_white,
                report.a_wins_as_black
            );
            println!("  {}: {} wins", report.agent_b, report.b_wins);
            println!("  Draws: {}", report.draws);
            println!("  Score: {:.1}/{}", report.a_score, report.total_games);
            println!(
                "  Average plies: {:.1} (stdev {:.1})",
                report.avg_move_count, report.std_move_count
            );
            if let Some(storage) = arena.storage() {
                let path = storage.save_report("compare", &report)?;
                println!("Report saved to {}", path.display());
            }
        }
        Commands::Openings => {
            println!("{} book positions", book.len());
            for line in book.openings() {
                println!("  {:<24} {}", line.name, line.moves.join(" "));
            }
        }
        Commands::Games => {
            let storage = StorageManager::new(&cli.output_dir)?;
            for game in storage.list_saved_games()? {
                println!(
                    "{}  {} vs {}  {:?}  {} moves",
                    game.game_id, game.white_player, game.black_player, game.result, game.move_count
                );
            }
        }
    }

    Ok(())
}
