//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use rand::Rng;

use super::schedule::Effect;
use super::stage::FrameContext;
use super::state::{EntityKind, GamePhase, GameState, StageKind};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Run left; wins over `right` when both are held
    pub left: bool,
    pub right: bool,
    /// Jump / double jump (acts on the press edge)
    pub jump: bool,
    /// Throw a sword at the boss (acts on the press edge)
    pub attack: bool,
    /// Start over from a terminal phase
    pub restart: bool,
    /// Idle/demo mode - AI plays the game
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase.is_terminal() {
        if input.restart {
            let seed = state.rng.random();
            state.restart(seed);
        }
        return;
    }

    state.time_ticks += 1;
    let now = state.time_ticks;

    match state.phase {
        GamePhase::Introduction => {
            while let Some(event) = state.scheduler.pop_due(now) {
                if event.effect == Effect::IntroFinished {
                    state.transition(GamePhase::PlayStage);
                    break;
                }
            }
        }
        GamePhase::PlayStage | GamePhase::BossStage => {
            let input = if input.autopilot {
                autopilot(state)
            } else {
                input.clone()
            };

            let exit = {
                let Some(stage) = state.stage.as_mut() else {
                    log::warn!("{:?} without an active stage", state.phase);
                    return;
                };
                let mut cx = FrameContext {
                    tuning: &state.tuning,
                    rng: &mut state.rng,
                    scheduler: &mut state.scheduler,
                    events: &mut state.events,
                    now,
                    dt,
                };
                stage.update(&input, &mut cx)
            };

            if let Some(exit) = exit {
                state.transition(exit.next_phase());
            }
        }
        GamePhase::GameOver | GamePhase::Victory => {}
    }
}

/// Demo player: chase collectibles, hop over bullets, pelt the boss
fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let Some(stage) = state.stage.as_ref() else {
        return input;
    };
    let player = &stage.player;
    let half = player.half_extents();

    let target_x = match stage.kind {
        StageKind::Play => stage
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Star | EntityKind::Sword | EntityKind::Mushroom))
            .min_by(|a, b| {
                let da = a.pos.distance_squared(player.pos);
                let db = b.pos.distance_squared(player.pos);
                da.total_cmp(&db)
            })
            .map_or(PLAYER_START_X, |e| e.pos.x),
        // Keep some distance from the boss
        StageKind::Boss => BOSS_X - 4.0 * BOSS_HALF_EXTENT,
    };

    let dx = target_x - player.pos.x;
    if dx < -half.x / 2.0 {
        input.left = true;
    } else if dx > half.x / 2.0 {
        input.right = true;
    }

    let bullet_close = stage
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Bullet && !e.is_weapon())
        .any(|b| {
            let ahead = b.pos.x - player.pos.x;
            ahead > 0.0 && ahead < 150.0 && (b.pos.y - player.pos.y).abs() < half.y + 12.0
        });
    let target_above = stage.kind == StageKind::Play
        && dx.abs() < 80.0
        && stage
            .entities
            .iter()
            .any(|e| e.pos.x == target_x && e.pos.y < player.pos.y - 2.0 * half.y);

    // Pulse the buttons so the press edges register
    input.jump = (bullet_close || target_above) && state.time_ticks % 2 == 0;
    if stage.kind == StageKind::Boss {
        input.attack = stage.session.score > 0 && state.time_ticks % 20 < 10;
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ms_to_ticks;
    use crate::sim::physics::Terrain;
    use crate::sim::state::{GameEvent, GameSession, StageTransfer};
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn run(state: &mut GameState, input: &TickInput, ticks: u64) {
        for _ in 0..ticks {
            tick(state, input, SIM_DT);
        }
    }

    fn intro_ticks(tuning: &Tuning) -> u64 {
        ms_to_ticks(tuning.intro_delay_ms)
    }

    fn phase_changes(state: &GameState) -> Vec<(GamePhase, GamePhase)> {
        state
            .events()
            .iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    /// Game advanced into the play stage with a short timer
    fn play_state(seed: u64, stage_secs: u32) -> GameState {
        let tuning = Tuning {
            stage_duration_secs: stage_secs,
            ..Tuning::default()
        };
        let intro = intro_ticks(&tuning);
        let mut state = GameState::new(seed, tuning);
        run(&mut state, &TickInput::default(), intro);
        assert_eq!(state.phase, GamePhase::PlayStage);
        state
    }

    #[test]
    fn test_intro_waits_then_plays() {
        let tuning = Tuning::default();
        let intro = intro_ticks(&tuning);
        let mut state = GameState::new(1, tuning);

        run(&mut state, &TickInput::default(), intro - 1);
        assert_eq!(state.phase, GamePhase::Introduction);
        assert!(state.stage.is_none());

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::PlayStage);
        let session = state.session().expect("session");
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, 3);
        assert_eq!(session.timer.remaining(), 180);
        assert_eq!(
            phase_changes(&state),
            vec![(GamePhase::Introduction, GamePhase::PlayStage)]
        );
    }

    #[test]
    fn test_time_up_carries_session_into_boss_stage() {
        let mut state = play_state(2, 2);
        {
            let session = &mut state.stage.as_mut().expect("stage").session;
            session.score = 42;
            session.lives = 2;
        }
        // Keep the player alive while the clock runs out
        for _ in 0..ms_to_ticks(2000) {
            if state.phase != GamePhase::PlayStage {
                break;
            }
            if let Some(stage) = state.stage.as_mut() {
                stage.session.lives = 2;
                stage.player.pos.y = PLAYER_START_Y;
                stage.player.vel.y = 0.0;
                stage.entities.retain(|_| false);
            }
            tick(&mut state, &TickInput::default(), SIM_DT);
        }

        assert_eq!(state.phase, GamePhase::BossStage);
        let stage = state.stage.as_ref().expect("stage");
        assert_eq!(stage.kind, StageKind::Boss);
        assert_eq!(stage.session.score, 42);
        assert_eq!(stage.session.lives, 2);
        assert_eq!(
            stage.boss.as_ref().map(|b| b.hit_points),
            Some(state.tuning.boss_hit_points)
        );
        // Only the boss stage bullet spawner survives the transition
        assert_eq!(state.scheduler.len(), 1);
        assert!(state.scheduler.contains(Effect::SpawnBullet));
    }

    #[test]
    fn test_defeat_in_play_stage_ends_game_once() {
        let mut state = play_state(3, 180);
        state.stage.as_mut().expect("stage").session.lives = 1;
        state.stage.as_mut().expect("stage").terrain = Default::default();

        run(&mut state, &TickInput::default(), 600);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.stage.is_none());
        assert!(state.scheduler.is_empty());
        assert_eq!(state.final_result.map(|r| r.lives()), Some(0));

        let game_overs = phase_changes(&state)
            .into_iter()
            .filter(|(_, to)| *to == GamePhase::GameOver)
            .count();
        assert_eq!(game_overs, 1);

        // Terminal: nothing advances and repeated transitions are refused
        let ticks = state.time_ticks;
        run(&mut state, &TickInput::default(), 10);
        assert_eq!(state.time_ticks, ticks);
        assert!(!state.transition(GamePhase::GameOver));
    }

    #[test]
    fn test_boss_defeat_is_victory() {
        let mut state = play_state(4, 180);
        assert!(state.transition(GamePhase::BossStage));
        {
            let stage = state.stage.as_mut().expect("stage");
            let boss = stage.boss.as_mut().expect("boss");
            boss.hit_points = 1;
            let pos = boss.pos;
            stage.entities.spawn_weapon(pos, Vec2::ZERO, 10);
        }
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Victory);
        assert!(state.events().contains(&GameEvent::BossDefeated));
    }

    #[test]
    fn test_boss_stage_defeat_skips_defeat_cue() {
        let mut state = play_state(5, 180);
        state.stage.as_mut().expect("stage").session.lives = 1;
        assert!(state.transition(GamePhase::BossStage));
        state.drain_events();
        {
            let stage = state.stage.as_mut().expect("stage");
            let pos = stage.player.pos;
            stage.entities.spawn(EntityKind::Bullet, pos, Vec2::ZERO);
        }
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.events().contains(&GameEvent::Defeated));
    }

    #[test]
    fn test_restart_from_terminal_phase() {
        let mut state = play_state(6, 180);
        state.stage.as_mut().expect("stage").session.lives = 1;
        state.stage.as_mut().expect("stage").terrain = Default::default();
        run(&mut state, &TickInput::default(), 600);
        assert_eq!(state.phase, GamePhase::GameOver);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, SIM_DT);
        assert_eq!(state.phase, GamePhase::Introduction);
        assert_eq!(state.time_ticks, 0);
        assert!(state.final_result.is_none());
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let mut state = play_state(7, 180);
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, SIM_DT);
        assert_eq!(state.phase, GamePhase::PlayStage);
    }

    #[test]
    fn test_determinism() {
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut a = GameState::new(12345, Tuning::default());
        let mut b = GameState::new(12345, Tuning::default());
        run(&mut a, &input, 3000);
        run(&mut b, &input, 3000);

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.events(), b.events());
        let session = |s: &GameState| s.session().map(StageTransfer::from);
        assert_eq!(session(&a), session(&b));
    }

    #[test]
    fn test_autopilot_collects_and_scores() {
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut state = play_state(99, 180);
        let stage = state.stage.as_mut().expect("stage");
        stage.terrain = Terrain::flat();

        // Land first so the star sits level with the player
        for _ in 0..240 {
            if let Some(stage) = state.stage.as_mut() {
                stage.entities.retain(|_| false);
            }
            tick(&mut state, &input, SIM_DT);
            if state.stage.as_ref().is_some_and(|s| s.player.grounded) {
                break;
            }
        }

        let stage = state.stage.as_mut().expect("stage");
        assert!(stage.player.grounded);
        let target = stage.player.pos + Vec2::new(100.0, 0.0);
        let star = stage.entities.spawn(EntityKind::Star, target, Vec2::ZERO);
        state.drain_events();

        for _ in 0..120 {
            if let Some(stage) = state.stage.as_mut() {
                stage.entities.retain(|e| e.id == star);
            }
            tick(&mut state, &input, SIM_DT);
        }

        assert!(state.events().contains(&GameEvent::Collected {
            kind: EntityKind::Star,
            points: 1,
        }));
        assert_eq!(state.session().map(|s| s.score), Some(1));
    }

    #[test]
    fn test_boss_session_from_transfer() {
        let mut source = GameSession::new(&Tuning::default());
        source.score = 9;
        let session = GameSession::from_transfer(StageTransfer::from(&source));
        assert_eq!(session.score, 9);
        assert!(session.timer.is_expired());
    }
}
