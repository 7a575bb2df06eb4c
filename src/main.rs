//! Star Dash entry point
//!
//! Runs a headless demo: the autopilot plays one full game at a fixed
//! frame rate and the final HUD is printed as JSON.
//!
//! Usage: `star-dash [tuning.json] [seed]`

use serde::Serialize;

use star_dash::audio::AudioManager;
use star_dash::consts::*;
use star_dash::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use star_dash::ui::Hud;
use star_dash::Tuning;

/// Simulated display refresh
const FRAME_DT: f32 = 1.0 / 60.0;
/// Stop after this much simulated time even if the game is still running
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// Game instance holding all state
struct Game {
    state: GameState,
    audio: AudioManager,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(seed, tuning),
            audio: AudioManager::new(),
            accumulator: 0.0,
            input: TickInput {
                autopilot: true,
                ..Default::default()
            },
        }
    }

    /// Run simulation ticks
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in self.state.drain_events() {
            self.audio.handle(&event);
            match event {
                GameEvent::PhaseChanged { from, to } => {
                    log::info!("{from:?} -> {to:?}");
                }
                GameEvent::BossDamaged { hit_points } if hit_points % 10 == 0 => {
                    log::info!("Boss HP {hit_points}");
                }
                GameEvent::Spawned { .. } | GameEvent::TimerTick(_) => {}
                other => log::debug!("{other:?}"),
            }
        }
    }
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    phase: GamePhase,
    ticks: u64,
    hud: Hud,
}

fn load_tuning(path: Option<&str>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    match Tuning::load(path) {
        Ok(tuning) => tuning,
        Err(err) => {
            log::warn!("Failed to load tuning ({err}), using defaults");
            Tuning::reset_to_defaults()
        }
    }
}

fn seed_from_clock() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() {
    // env_logger is a native-only dependency
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let tuning = load_tuning(args.first().map(String::as_str));
    let seed = match args.get(1).map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(err)) => {
            log::warn!("Invalid seed ({err}), using clock");
            seed_from_clock()
        }
        None => seed_from_clock(),
    };
    log::info!("Star Dash (headless) starting with seed {seed}");

    let mut game = Game::new(seed, tuning);
    let mut frames = 0;
    while !game.state.phase.is_terminal() && frames < MAX_FRAMES {
        game.update(FRAME_DT);
        frames += 1;
    }
    if !game.state.phase.is_terminal() {
        log::warn!("Stopped after {frames} frames in {:?}", game.state.phase);
    }

    let summary = Summary {
        seed,
        phase: game.state.phase,
        ticks: game.state.time_ticks,
        hud: Hud::from_state(&game.state),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to serialize summary: {err}"),
    }
}
