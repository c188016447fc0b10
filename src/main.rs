//! Volcano Jump headless runner
//!
//! Lets the autopilot climb one session at the fixed tick, then records the
//! run on the leaderboard.
//!
//! Usage: `volcano-jump [--config volcano.json] [--name ASH]`

use std::path::PathBuf;

use clap::Parser;
use volcano_jump::consts::{MAX_SUBSTEPS, SIM_DT};
use volcano_jump::highscores::submit_score;
use volcano_jump::sim::{GameEvent, GameSession, TickInput, tick};
use volcano_jump::{ScoreFile, VolcanoConfig};

/// Simulated frame length of the driver (two ticks per frame)
const FRAME_DT: f32 = 1.0 / 30.0;
/// Give up after this many frames (ten simulated minutes)
const MAX_FRAMES: u32 = 18_000;

#[derive(Parser, Debug)]
#[command(name = "volcano-jump")]
#[command(about = "Headless autopilot run through the volcano, recorded on the leaderboard")]
struct Cli {
    /// JSON world and balance config (defaults when missing or malformed)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Leaderboard name (up to 10 printable characters)
    #[arg(long, default_value = "AUTOPILOT")]
    name: String,
    /// Override the generation seed
    #[arg(long)]
    seed: Option<u64>,
    /// Score file location
    #[arg(long, default_value = ScoreFile::DEFAULT_PATH)]
    scores: PathBuf,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => VolcanoConfig::load(path),
        None => VolcanoConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let name = cli.name;

    log::info!("Volcano Jump (headless) starting, seed {}", config.seed);

    let mut session = GameSession::new(config);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let mut accumulator = 0.0f32;
    let mut frames = 0;
    while !session.is_over() && frames < MAX_FRAMES {
        frames += 1;
        accumulator += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            for event in tick(&mut session, &input, SIM_DT) {
                report(&event);
            }
            accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    println!(
        "Run finished after {:.1} s: {:?}, score {}, height {:.1} km ({})",
        session.elapsed_ms / 1000.0,
        session.phase,
        session.world.score,
        session.world.km_height,
        session.world.current_level.name()
    );

    let mut store = ScoreFile::new(cli.scores);
    let board = submit_score(&mut store, &name, session.world.score, session.world.km_height);
    if board.is_empty() {
        println!("Leaderboard unavailable");
        return;
    }

    println!("\nTop scores:");
    for (rank, entry) in board.iter().enumerate() {
        println!(
            "{:>2}. {:<10} {:>8}  {:>5.1} km  {}",
            rank + 1,
            entry.name,
            entry.score,
            entry.height,
            entry.date
        );
    }
}

fn report(event: &GameEvent) {
    match event {
        GameEvent::LevelChanged { from, to } => {
            println!("Climbed from the {} into the {}", from.name(), to.name());
        }
        GameEvent::EruptionActivated { .. } => println!("The crater erupts!"),
        GameEvent::EruptionRewarded { bonus } => println!("Eruption bonus +{bonus}"),
        GameEvent::PlayerLost { reason } => println!("Run lost: {reason:?}"),
        other => log::debug!("{other:?}"),
    }
}
