use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ml_board_games::ai::{build_agent, AgentKind, AgentSettings, QLearningAgent, QLearningConfig};
use ml_board_games::checkpoint::{CheckpointData, CheckpointManager};
use ml_board_games::config::AppConfig;
use ml_board_games::error::CheckpointError;
use ml_board_games::game::{BoardState, ConnectFour, GameKind, Mark, TicTacToe};
use ml_board_games::training::{Trainer, TrainingReport};

/// Who the learner trains against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opponent {
    SelfPlay,
    Agent(AgentKind),
}

impl FromStr for Opponent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("self") {
            return Ok(Opponent::SelfPlay);
        }
        s.parse().map(Opponent::Agent)
    }
}

/// Train a tabular Q-learning agent.
#[derive(Parser)]
#[command(name = "train", about = "Train a Q-learning agent for tic-tac-toe or Connect Four")]
struct Cli {
    /// Game to train on: ttt or connect4
    #[arg(long, default_value = "ttt")]
    game: GameKind,

    /// Opponent: self, minimax, alpha-beta, qlearning, default or random
    #[arg(long, default_value = "random")]
    opponent: Opponent,

    /// Mark the learner plays against a fixed opponent
    #[arg(long, default_value = "x")]
    mark: Mark,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Checkpoint directory (default: the configured directory, per game)
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Seed the learners, the opponent and evaluation games
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(episodes) = cli.episodes {
        app_config.training.num_episodes = episodes;
    }
    if let Some(lr) = cli.lr {
        app_config.qlearning.learning_rate = lr;
    }
    if cli.seed.is_some() {
        app_config.training.seed = cli.seed;
    }
    app_config.checkpoint.checkpoint_dir = match &cli.checkpoint_dir {
        Some(dir) => dir.clone(),
        None => app_config.checkpoint.checkpoint_dir.join(cli.game.name()),
    };
    app_config
        .validate()
        .context("invalid configuration after overrides")?;

    let report = match cli.game {
        GameKind::TicTacToe => run::<TicTacToe>(&cli, &app_config)?,
        GameKind::ConnectFour => run::<ConnectFour>(&cli, &app_config)?,
    };
    print_report(&report);
    Ok(())
}

fn run<B: BoardState + Default + 'static>(
    cli: &Cli,
    config: &AppConfig,
) -> Result<TrainingReport> {
    let (mut resumed, start_episode) = if cli.resume {
        match resume::<B>(config)? {
            Some(data) => {
                let episode = data.metadata.episode;
                (Some(data), episode)
            }
            None => (None, 0),
        }
    } else {
        (None, 0)
    };

    let trainer = Trainer::new(config.training.clone(), config.checkpoint.clone());
    let mut learner = |mark: Mark| -> Result<QLearningAgent<B>> {
        let table = resumed.as_mut().and_then(|data| data.take_table(mark));
        let agent = match table {
            Some(table) => QLearningAgent::with_table(mark, table, config.qlearning.clone())
                .with_context(|| format!("restoring {mark} Q-table"))?,
            None => QLearningAgent::new(mark, config.qlearning.clone()),
        };
        Ok(match cli.seed {
            Some(seed) => agent.with_seed(seed.wrapping_add(mark as u64)),
            None => agent,
        })
    };

    match cli.opponent {
        Opponent::SelfPlay => {
            let mut x = learner(Mark::X)?;
            let mut o = learner(Mark::O)?;
            Ok(trainer.train_self_play(&mut x, &mut o, start_episode)?)
        }
        Opponent::Agent(kind) => {
            let mut agent = learner(cli.mark)?;
            let opponent_mark = cli.mark.other();
            let settings = AgentSettings {
                depth: config.search.depth_for(cli.game),
                qlearning: QLearningConfig {
                    epsilon: 0.0,
                    ..config.qlearning.clone()
                },
                table: None,
                seed: cli.seed.map(|seed| seed.wrapping_add(2)),
            };
            let mut opponent = build_agent::<B>(kind, opponent_mark, settings)
                .with_context(|| format!("building {kind} opponent"))?;
            let report = trainer.train_against(&mut agent, opponent.as_mut(), start_episode)?;
            Ok(report)
        }
    }
}

/// Latest checkpoint for this game, or `None` when there is nothing to
/// resume from yet.
fn resume<B: BoardState>(config: &AppConfig) -> Result<Option<CheckpointData>> {
    let manager = CheckpointManager::new(config.checkpoint.clone());
    let data = match manager.load_latest() {
        Ok(data) => data,
        Err(e @ CheckpointError::NoLatestSymlink(_)) => {
            println!("No checkpoint found ({e}), starting fresh");
            return Ok(None);
        }
        Err(e) => return Err(e).context("loading latest checkpoint"),
    };
    if data.metadata.game != B::NAME {
        bail!(
            "checkpoint {} was trained on {}, not {}",
            data.path.display(),
            data.metadata.game,
            B::NAME
        );
    }
    println!(
        "Resumed from episode {} ({})",
        data.metadata.episode,
        data.path.display()
    );
    Ok(Some(data))
}

fn print_report(report: &TrainingReport) {
    println!("-------------------------------------------");
    println!(
        "Episodes: {} (last episode {})",
        report.episodes, report.last_episode
    );
    println!(
        "Last window: {:.1}% wins, {:.1}% draws",
        report.window_win_rate * 100.0,
        report.window_draw_rate * 100.0
    );
    for (mark, rate) in &report.final_win_rates {
        println!("{mark} greedy vs Random: {:.1}% wins", rate * 100.0);
    }
    match report.checkpoints.last() {
        Some(path) => println!(
            "Checkpoints saved: {} (latest {})",
            report.checkpoints.len(),
            path.display()
        ),
        None => println!("No checkpoints saved"),
    }
}
