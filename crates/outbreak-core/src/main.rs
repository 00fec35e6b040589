//! Headless runner for the outbreak simulation.
//!
//! Loads a map, seeds a survivor population, drops a few zombies in, and
//! streams world events to the terminal until the clock runs out.
//!
//! Examples:
//!   cargo run -p outbreak-core -- --map map.json --duration 60
//!   cargo run -p outbreak-core -- --map map.json --zombies 5 --events-out events.jsonl

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use clap::Parser;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use outbreak_core::eventlog::EventLog;
use outbreak_core::persistence::MapFile;
use outbreak_core::seed::{seed_population, SeedConfig};
use outbreak_core::{SimConfig, World};

/// Headless apocalypse-world simulation
#[derive(Parser, Debug)]
#[command(name = "outbreak")]
#[command(about = "Runs the agent simulation without a renderer")]
struct Args {
    /// Path to the world map JSON
    #[arg(long, default_value = "map.json")]
    map: PathBuf,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long to run, in seconds
    #[arg(long, default_value_t = 30)]
    duration: u64,

    /// Zombies to drop at random locations on startup
    #[arg(long, default_value_t = 3)]
    zombies: u32,

    /// Random seed (overrides the config value)
    #[arg(long)]
    seed: Option<u64>,

    /// Append every world event as JSONL to this path
    #[arg(long)]
    events_out: Option<PathBuf>,

    /// Print the final world snapshot as JSON
    #[arg(long)]
    snapshot: bool,
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("outbreak: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let map = MapFile::load(&args.map)?;
    let (log_tx, log_rx) = mpsc::channel();
    let world = World::from_map(map, config, log_tx)?;

    let mut rng = SmallRng::seed_from_u64(world.config().seed);
    let spawned = seed_population(&world, &SeedConfig::default(), &mut rng);
    info!(people = spawned, "seeded population");
    world.start_agents();

    let locations = world.location_ids();
    for _ in 0..args.zombies {
        if let Some(&location) = locations.choose(&mut rng) {
            world.add_zombie(location);
        }
    }

    let mut event_log = match &args.events_out {
        Some(path) => EventLog::new(path)?,
        None => EventLog::null(),
    };

    let deadline = Instant::now() + Duration::from_secs(args.duration);
    while Instant::now() < deadline {
        match log_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => {
                info!("{event}");
                event_log.log(&event)?;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    event_log.flush()?;

    let snap = world.snapshot();
    info!(
        people = snap.person_count(),
        zombies = snap.zombie_count(),
        events = event_log.event_count(),
        "simulation finished"
    );
    if args.snapshot {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    }
    Ok(())
}
