//! Brushfire Simulator
//!
//! Headless run of the movement and combat simulation.
//! Plays a scripted input sequence through a map, logs the interesting
//! events, then replays the same inputs and checks the state hashes match.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use brushfire::{
    game::{
        events::GameEventData,
        map::{Brush, Entity, EntityType},
        tick::{replay_hash, tick},
    },
    GameConfig, InputFrame, Map, WorldState, NOMINAL_DT, VERSION,
};

/// Headless brushfire simulation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file (defaults are used for missing fields)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON map file (a built-in arena is used if omitted)
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 1200)]
    ticks: u32,

    /// Timestep per tick in seconds
    #[arg(long, default_value_t = NOMINAL_DT)]
    dt: f32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the default level
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Brushfire Simulator v{}", VERSION);

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };

    let map = match &args.map {
        Some(path) => {
            Map::load(path).with_context(|| format!("failed to load map {}", path.display()))?
        }
        None => demo_arena(),
    };
    info!(
        brushes = map.brushes().len(),
        entities = map.entities().len(),
        "Map ready"
    );

    let inputs: Vec<InputFrame> = (0..args.ticks).map(scripted_input).collect();
    run_session(&map, &config, &inputs, args.dt);

    Ok(())
}

/// Play `inputs` through a fresh session, then verify by replay.
fn run_session(map: &Map, config: &GameConfig, inputs: &[InputFrame], dt: f32) {
    info!("=== Starting Session ===");
    info!("RNG Seed: {:#x}", config.simulation.rng_seed);

    let mut state = WorldState::new(Some(map), config);
    let mut total_events = state.take_events().len();
    let mut shots = 0u32;

    for (t, input) in inputs.iter().enumerate() {
        let result = tick(&mut state, Some(map), input, dt);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::BulletFired { .. } => shots += 1,
                GameEventData::EnemyKilled { enemy_id, point } => {
                    info!(
                        "Tick {}: enemy {} killed at ({:.2}, {:.2}, {:.2})",
                        event.tick, enemy_id, point.x, point.y, point.z
                    );
                }
                GameEventData::RoomCleared { kills } => {
                    info!("Tick {}: room cleared ({} kills)", event.tick, kills);
                }
                GameEventData::PlayerDied { position } => {
                    warn!(
                        "Tick {}: player died at ({:.2}, {:.2}, {:.2})",
                        event.tick, position.x, position.y, position.z
                    );
                }
                other => debug!(tick = event.tick, "{:?}", other),
            }
        }

        // Report every 5 seconds of simulated time
        if t > 0 && t % 300 == 0 {
            let p = &state.player;
            info!(
                "Tick {}: player ({:.2}, {:.2}, {:.2}) {:?}, hp {:.0}, {} enemies left",
                state.tick,
                p.position.x,
                p.position.y,
                p.position.z,
                p.state(),
                p.hp,
                state.enemies.live_count()
            );
        }
    }

    info!("=== Session Results ===");
    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Shots fired: {}, kills: {}, room cleared: {}", shots, state.kills, state.room_cleared);
    info!("Total events: {}", total_events);

    info!("=== Verifying Determinism ===");
    let replayed = replay_hash(Some(map), config, inputs, dt);
    info!("Replay State Hash: {}", hex::encode(replayed));

    if hash == replayed {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }
}

/// Input for tick `t`: walk forward sweeping the view, sprint and slide
/// once, jump every few seconds, and hold fire throughout.
fn scripted_input(t: u32) -> InputFrame {
    let mut buttons = InputFrame::FORWARD | InputFrame::FIRE;

    match t % 600 {
        120 => buttons |= InputFrame::SPRINT,
        200 => buttons |= InputFrame::CROUCH,
        400 => buttons |= InputFrame::SPRINT,
        _ => {}
    }
    if t % 180 == 90 {
        buttons |= InputFrame::JUMP;
    }

    let angle = t as f32 * 0.01;
    InputFrame::with_buttons(buttons).looking(Vec3::new(angle.sin(), -0.05, -angle.cos()))
}

/// Walled floor with a step and three enemies.
fn demo_arena() -> Map {
    let mut map = Map::default();
    let mut next_id = 0u32;
    let mut brush = |min: Vec3, max: Vec3, material: &str| {
        next_id += 1;
        Brush::cuboid(next_id, min, max, material)
    };

    let floor = brush(Vec3::new(-20.0, -1.0, -20.0), Vec3::new(20.0, 0.0, 20.0), "floor");
    let north = brush(Vec3::new(-20.0, 0.0, -21.0), Vec3::new(20.0, 6.0, -20.0), "wall");
    let south = brush(Vec3::new(-20.0, 0.0, 20.0), Vec3::new(20.0, 6.0, 21.0), "wall");
    let west = brush(Vec3::new(-21.0, 0.0, -20.0), Vec3::new(-20.0, 6.0, 20.0), "wall");
    let east = brush(Vec3::new(20.0, 0.0, -20.0), Vec3::new(21.0, 6.0, 20.0), "wall");
    let step = brush(Vec3::new(-4.0, 0.0, -10.0), Vec3::new(4.0, 0.25, -6.0), "step");
    for b in [floor, north, south, west, east, step] {
        map.add_brush(b);
    }
    map.classify_surfaces();

    map.add_entity(Entity::new(EntityType::PlayerStart, Vec3::new(0.0, 2.0, 10.0)));
    for position in [
        Vec3::new(-6.0, 1.0, -12.0),
        Vec3::new(0.0, 1.0, -16.0),
        Vec3::new(6.0, 1.0, -12.0),
    ] {
        map.add_entity(Entity::new(EntityType::EnemySpawn, position));
    }

    map
}
