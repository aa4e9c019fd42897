//! Headless Robot Arena runner.
//!
//! Loads a configuration, seeds the default scenario plus any requested
//! robots, and runs the simulation without a window. Draw calls go to a
//! [`RecordingCanvas`] so the full tick protocol still runs.
//!
//! By default the day/night clock is paced in ticks (one in-game hour every
//! `tick_rate × cycle_secs / hours_per_day` ticks) and the run is as fast as
//! the machine allows. With `--realtime` the driver sleeps between ticks and a
//! clock thread fires the hours on wall time instead.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use robot_arena_core::entity::AgentKind;
use robot_arena_core::{Arena, ArenaConfig, ArenaEvent, ArenaSnapshot, RecordingCanvas, Simulation};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "robot-arena-headless")]
#[command(about = "Runs the Robot Arena simulation without a window")]
struct Args {
    /// TOML configuration file; defaults are used for anything missing
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Random seed, overriding the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Pace ticks and clock hours on wall time
    #[arg(long)]
    realtime: bool,

    /// Speed multiplier for realtime runs
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Extra robots to add, e.g. `--robot lumber --robot basic`
    #[arg(long = "robot", value_parser = parse_agent_kind)]
    robots: Vec<AgentKind>,

    /// Resume from a snapshot instead of seeding a new arena
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write a JSON snapshot here when the run ends
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Ticks between progress reports
    #[arg(long, default_value_t = 600)]
    report_every: u64,
}

fn parse_agent_kind(name: &str) -> Result<AgentKind, String> {
    match name.to_ascii_lowercase().as_str() {
        "basic" => Ok(AgentKind::Basic),
        "smart" => Ok(AgentKind::Smart),
        "predator" => Ok(AgentKind::Predator),
        "lumber" => Ok(AgentKind::Lumber),
        "miner" => Ok(AgentKind::Miner),
        other => Err(format!(
            "unknown robot `{other}` (expected basic, smart, predator, lumber or miner)"
        )),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_config(args: &Args) -> Result<ArenaConfig> {
    let mut config = match &args.config {
        Some(path) => ArenaConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ArenaConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("validating config")?;
    Ok(config)
}

fn build_arena(args: &Args, config: ArenaConfig) -> Result<Arena> {
    let mut arena = match &args.resume {
        Some(path) => {
            let snapshot = ArenaSnapshot::load(path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            Arena::restore(snapshot, config).context("restoring snapshot")?
        }
        None => {
            let mut arena = Arena::new(config);
            arena.seed_default_scenario();
            arena
        }
    };
    for &kind in &args.robots {
        let id = arena.add_agent(kind);
        tracing::info!(%kind, entity = %id, "added robot");
    }
    Ok(arena)
}

/// Ticks per in-game hour when the clock is paced by ticks.
fn ticks_per_hour(arena: &Arena) -> u64 {
    let hour = arena.clock().hour_interval().as_secs_f32();
    arena.config().timing.ticks_for(hour).max(1)
}

fn event_name(event: &ArenaEvent) -> &'static str {
    match event {
        ArenaEvent::Added { .. } => "added",
        ArenaEvent::Removed { .. } => "removed",
        ArenaEvent::ResourceCollected { .. } => "collected",
        ArenaEvent::ObstacleBroken { .. } => "broken",
        ArenaEvent::PreyCaught { .. } => "prey_caught",
        ArenaEvent::WorkerLost { .. } => "worker_lost",
        ArenaEvent::NightStarted { .. } => "night",
        ArenaEvent::DayStarted { .. } => "day",
        ArenaEvent::ShopOpened { .. } => "shop_opened",
        ArenaEvent::Purchased { .. } => "purchased",
        ArenaEvent::UpdateFailed { .. } => "update_failed",
    }
}

fn report(arena: &Arena, totals: &BTreeMap<&'static str, usize>) {
    let mut population: BTreeMap<String, usize> = BTreeMap::new();
    for entity in arena.entities() {
        *population.entry(entity.tag().to_string()).or_default() += 1;
    }
    tracing::info!(
        tick = arena.current_tick(),
        hour = arena.clock().hour(),
        night = arena.clock().is_night(),
        wood = arena.economy().wood(),
        rock = arena.economy().rock(),
        population = ?population,
        events = ?totals,
        "progress"
    );
}

fn run(args: &Args) -> Result<Arena> {
    let config = load_config(args)?;
    let arena = build_arena(args, config)?;
    let hour_ticks = ticks_per_hour(&arena);

    let mut sim = Simulation::from_arena(arena);
    sim.set_speed(args.speed);
    if args.realtime {
        sim.start_clock().context("starting clock thread")?;
    }

    tracing::info!(
        ticks = args.ticks,
        realtime = args.realtime,
        hour_ticks,
        entities = sim.arena().len(),
        "starting run"
    );

    let mut canvas = RecordingCanvas::new();
    let mut totals: BTreeMap<&'static str, usize> = BTreeMap::new();
    for step in 1..=args.ticks {
        if !args.realtime && step % hour_ticks == 0 {
            sim.advance_clock_hour();
        }
        sim.step(&mut canvas);

        for event in sim.arena_mut().take_events() {
            if let ArenaEvent::UpdateFailed { id, reason } = &event {
                tracing::warn!(entity = %id, %reason, "entity update failed");
            }
            *totals.entry(event_name(&event)).or_default() += 1;
        }
        for notice in sim.arena_mut().take_notices() {
            tracing::info!(resource = notice.resource.as_str(), total = notice.total, "threshold reached");
        }
        if args.report_every > 0 && step % args.report_every == 0 {
            report(sim.arena(), &totals);
        }
        if args.realtime {
            thread::sleep(sim.tick_interval());
        }
    }

    let arena = sim.into_arena();
    report(&arena, &totals);
    Ok(arena)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let arena = run(&args)?;

    if let Some(path) = &args.snapshot {
        arena
            .snapshot()
            .save(path)
            .with_context(|| format!("writing snapshot to {}", path.display()))?;
        tracing::info!(path = %path.display(), entities = arena.len(), "snapshot written");
    }
    Ok(())
}
