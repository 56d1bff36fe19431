//! Headless driver for the lane-dodging car game.
//!
//! `cargame play` runs episodes with a policy (optionally behind observation
//! normalization) and logs each episode's score; `cargame normalize` checks a
//! statistics file against a raw observation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use cargame::agent::{Agent, EpisodeSummary, PolicyAgent};
use cargame::config::GameConfig;
use cargame::environments::car_game::{Action, CarGame, StepInfo};
use cargame::normalizer::{NormalizationStats, ObservationNormalizer};
use cargame::policies::{HeuristicPolicy, RandomPolicy};
use cargame::policy::Policy;

#[derive(Parser)]
#[command(name = "cargame", about = "Play the car dodging environment with a policy")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run episodes and report the final score of each
    Play(PlayArgs),
    /// Normalize one observation with a statistics file and print it as JSON
    Normalize {
        #[arg(long)]
        stats: PathBuf,
        /// Comma separated observation, e.g. `0,1,0.42`
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        obs: Vec<f32>,
    },
}

#[derive(clap::Args)]
struct PlayArgs {
    #[arg(long, default_value_t = 5)]
    episodes: usize,
    #[arg(long)]
    seed: Option<u64>,
    /// Game geometry / reward configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Observation normalization statistics (JSON)
    #[arg(long)]
    stats: Option<PathBuf>,
    /// TorchScript policy; requires the `torch` feature
    #[arg(long)]
    model: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = PolicyKind::Heuristic)]
    policy: PolicyKind,
    #[arg(long)]
    max_steps: Option<usize>,
    /// Save a reward-per-episode plot to this PNG
    #[arg(long)]
    plot: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyKind {
    Heuristic,
    Random,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Play(args) => play(args),
        Command::Normalize { stats, obs } => {
            let stats = NormalizationStats::from_path(&stats)
                .with_context(|| format!("loading stats from {}", stats.display()))?;
            let normalized = ObservationNormalizer::new(stats).normalize(&obs)?;
            println!("{}", serde_json::to_string(&normalized)?);
            Ok(())
        }
    }
}

fn play(args: PlayArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("loading game config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    let mut env = match args.seed {
        Some(seed) => CarGame::with_seed(config, seed)?,
        None => CarGame::new(config)?,
    };

    let mut normalizer = match &args.stats {
        Some(path) => Some(ObservationNormalizer::new(
            NormalizationStats::from_path(path)
                .with_context(|| format!("loading stats from {}", path.display()))?,
        )),
        None => None,
    };

    let policy: Box<dyn Policy<[f32], Action>> = match (&args.model, args.policy) {
        (Some(path), _) => load_model(path)?,
        (None, PolicyKind::Heuristic) => {
            // 启发式策略的阈值基于原始观测
            if normalizer.take().is_some() {
                tracing::warn!("--stats ignored: the heuristic policy reads raw observations");
            }
            Box::new(HeuristicPolicy::default())
        }
        (None, PolicyKind::Random) => Box::new(match args.seed {
            Some(seed) => RandomPolicy::with_seed(seed),
            None => RandomPolicy::new(),
        }),
    };

    let mut agent = PolicyAgent::new(policy);
    if let Some(normalizer) = normalizer {
        agent = agent.with_normalizer(normalizer);
    }
    if let Some(max_steps) = args.max_steps {
        agent = agent.with_max_steps(max_steps);
    }

    let summaries = agent.play(&mut env, args.episodes, args.plot.as_deref())?;
    report(&summaries);
    Ok(())
}

#[cfg(feature = "torch")]
fn load_model(path: &std::path::Path) -> Result<Box<dyn Policy<[f32], Action>>> {
    let policy = cargame::policies::TorchScriptPolicy::load(path, tch::Device::cuda_if_available())?;
    Ok(Box::new(policy))
}

#[cfg(not(feature = "torch"))]
fn load_model(path: &std::path::Path) -> Result<Box<dyn Policy<[f32], Action>>> {
    anyhow::bail!(
        "cannot load {}: built without the `torch` feature",
        path.display()
    )
}

fn report(summaries: &[EpisodeSummary<StepInfo>]) {
    let scores: Vec<u32> = summaries
        .iter()
        .filter_map(|s| s.final_info.map(|info| info.score))
        .collect();
    if scores.is_empty() {
        return;
    }
    let best = scores.iter().copied().max().unwrap_or(0);
    let mean = scores.iter().sum::<u32>() as f32 / scores.len() as f32;
    tracing::info!(episodes = scores.len(), best, mean, "playback done");
}
