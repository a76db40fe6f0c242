use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ml_board_games::ai::{build_agent, Agent, AgentKind, AgentSettings, QLearningConfig, QTable};
use ml_board_games::arena::{play_game, MatchSummary};
use ml_board_games::checkpoint::{CheckpointManager, CheckpointManagerConfig};
use ml_board_games::config::AppConfig;
use ml_board_games::game::{BoardState, ConnectFour, GameKind, GameOutcome, Mark, TicTacToe};

/// Pit two agents against each other.
#[derive(Parser)]
#[command(name = "play", about = "Play tic-tac-toe or Connect Four between two agents")]
struct Cli {
    /// Game to play: ttt or connect4
    #[arg(long, default_value = "ttt")]
    game: GameKind,

    /// Agent playing X: minimax, alpha-beta, qlearning, default or random
    #[arg(long, default_value = "alpha-beta")]
    x: AgentKind,

    /// Agent playing O
    #[arg(long, default_value = "random")]
    o: AgentKind,

    /// Number of games
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Print the board after every move
    #[arg(long)]
    show: bool,

    /// Directory holding trained Q-tables (default: the configured directory, per game)
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Seed every agent for a reproducible series
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    app_config.checkpoint.checkpoint_dir = match &cli.checkpoint_dir {
        Some(dir) => dir.clone(),
        None => app_config.checkpoint.checkpoint_dir.join(cli.game.name()),
    };

    match cli.game {
        GameKind::TicTacToe => run::<TicTacToe>(&cli, &app_config),
        GameKind::ConnectFour => run::<ConnectFour>(&cli, &app_config),
    }
}

fn run<B: BoardState + Default + 'static>(cli: &Cli, config: &AppConfig) -> Result<()> {
    let mut x = make_agent::<B>(cli, config, cli.x, Mark::X)?;
    let mut o = make_agent::<B>(cli, config, cli.o, Mark::O)?;

    println!(
        "{}: {} (X) vs {} (O), {} game(s)",
        B::NAME,
        x.name(),
        o.name(),
        cli.games
    );

    let mut summary = MatchSummary::default();
    for game in 1..=cli.games {
        let record = play_game(B::default(), x.as_mut(), o.as_mut())
            .with_context(|| format!("game {game}"))?;

        if cli.show {
            let mut board = B::default();
            println!("\nGame {game}\n{board}");
            for mv in &record.moves {
                let mark = board.current_mark();
                board.play(*mv)?;
                println!("{mark} plays {mv:?}\n{board}");
            }
        }
        let result = match record.outcome {
            GameOutcome::Winner(mark) => format!("{mark} wins"),
            GameOutcome::Draw => "draw".to_string(),
        };
        println!("Game {game}: {result} in {} moves", record.moves.len());

        summary.record(&record);
    }

    print_summary(&summary, x.as_ref(), o.as_ref());
    Ok(())
}

fn make_agent<B: BoardState + 'static>(
    cli: &Cli,
    config: &AppConfig,
    kind: AgentKind,
    mark: Mark,
) -> Result<Box<dyn Agent<B>>> {
    let game = cli.game;
    let table = if kind == AgentKind::QLearning {
        load_table::<B>(&config.checkpoint, mark)?
    } else {
        None
    };
    let settings = AgentSettings {
        depth: config.search.depth_for(game),
        // Trained agents play greedily.
        qlearning: QLearningConfig {
            epsilon: 0.0,
            ..config.qlearning.clone()
        },
        table,
        seed: cli.seed.map(|seed| seed.wrapping_add(mark as u64)),
    };
    build_agent::<B>(kind, mark, settings)
        .with_context(|| format!("building {kind} agent for {mark}"))
}

/// Q-table for `mark` from the latest checkpoint, if there is one.
fn load_table<B: BoardState>(
    checkpoint: &CheckpointManagerConfig,
    mark: Mark,
) -> Result<Option<QTable>> {
    let manager = CheckpointManager::new(checkpoint.clone());
    let mut data = match manager.load_latest() {
        Ok(data) => data,
        Err(e) => {
            log::warn!("no trained Q-table ({e}); {mark} starts untrained");
            return Ok(None);
        }
    };
    if data.metadata.game != B::NAME {
        bail!(
            "checkpoint {} was trained on {}, not {}",
            data.path.display(),
            data.metadata.game,
            B::NAME
        );
    }
    let table = data.take_table(mark);
    match &table {
        Some(table) => log::info!(
            "loaded {} Q-table ({} states) from episode {}",
            mark,
            table.len(),
            data.metadata.episode
        ),
        None => log::warn!(
            "checkpoint {} has no table for {mark}; {mark} starts untrained",
            data.path.display()
        ),
    }
    Ok(table)
}

fn print_summary<B: BoardState>(summary: &MatchSummary, x: &dyn Agent<B>, o: &dyn Agent<B>) {
    println!("-------------------------------------------");
    println!(
        "X wins: {} | O wins: {} | draws: {} | games: {}",
        summary.x_wins, summary.o_wins, summary.draws, summary.games
    );
    for (mark, agent, side) in [(Mark::X, x, &summary.x), (Mark::O, o, &summary.o)] {
        let nodes = match side.average_nodes() {
            Some(avg) => format!("{avg:.1} nodes/search"),
            None => "no search".to_string(),
        };
        println!(
            "{mark} ({}): {nodes}, {:.3} ms/move",
            agent.name(),
            side.average_move_time().as_secs_f64() * 1000.0
        );
    }
}
