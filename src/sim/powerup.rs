//! Timed power-ups
//!
//! Baseline stats always come from [`Tuning`]. Active power-ups only
//! contribute multipliers, so expiry restores the exact baseline.

use super::schedule::{Effect, Scheduler};
use super::state::{GameSession, PowerUpKind, PowerUpState};
use crate::ms_to_ticks;
use crate::tuning::Tuning;

/// Multipliers a power-up applies on top of the baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatModifiers {
    pub speed: f32,
    pub gravity: f32,
    pub size: f32,
}

impl StatModifiers {
    pub const IDENTITY: Self = Self {
        speed: 1.0,
        gravity: 1.0,
        size: 1.0,
    };
}

impl PowerUpKind {
    pub fn modifiers(self) -> StatModifiers {
        match self {
            PowerUpKind::Growth => StatModifiers {
                speed: 2.0,
                gravity: 0.5,
                size: 2.0,
            },
            PowerUpKind::ScoreBoost => StatModifiers {
                speed: 2.0,
                gravity: 2.0,
                size: 1.0,
            },
        }
    }

    fn duration_ms(self, tuning: &Tuning) -> u32 {
        match self {
            PowerUpKind::Growth => tuning.growth_duration_ms,
            PowerUpKind::ScoreBoost => tuning.boost_duration_ms,
        }
    }

    fn expiry_effect(self) -> Effect {
        match self {
            PowerUpKind::Growth => Effect::PowerUpExpired,
            PowerUpKind::ScoreBoost => Effect::BoostExpired,
        }
    }
}

/// Movement stats in effect this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    /// Player run speed
    pub speed: f32,
    /// Gravity on the player body
    pub gravity: f32,
    pub size_scale: f32,
    /// Speed of spawned projectiles and collectibles
    pub world_speed: f32,
    /// Gravity used to size jump impulses
    pub world_gravity: f32,
}

/// Combine the baseline with whatever is active in `session`
pub fn effective_stats(tuning: &Tuning, session: &GameSession) -> PlayerStats {
    let world = session
        .boost
        .map_or(StatModifiers::IDENTITY, |p| p.kind.modifiers());
    let personal = session
        .power_up
        .map_or(StatModifiers::IDENTITY, |p| p.kind.modifiers());

    let world_speed = tuning.dude_speed * world.speed;
    let world_gravity = tuning.dude_gravity * world.gravity;
    PlayerStats {
        speed: world_speed * personal.speed,
        gravity: world_gravity * personal.gravity,
        size_scale: personal.size,
        world_speed,
        world_gravity,
    }
}

/// Start `kind` now, replacing any activation of the same kind
pub fn activate(
    session: &mut GameSession,
    kind: PowerUpKind,
    now: u64,
    scheduler: &mut Scheduler,
    tuning: &Tuning,
) -> PowerUpState {
    let expires_at = now + ms_to_ticks(kind.duration_ms(tuning));
    let expiry_event = scheduler.schedule_at(expires_at, kind.expiry_effect());
    let state = PowerUpState {
        kind,
        expires_at,
        expiry_event,
    };

    let slot = match kind {
        PowerUpKind::Growth => &mut session.power_up,
        PowerUpKind::ScoreBoost => &mut session.boost,
    };
    if slot.replace(state).is_some() {
        log::debug!("{kind:?} refreshed, now expires at tick {expires_at}");
    } else {
        log::info!("{kind:?} active until tick {expires_at}");
    }
    state
}

/// Handle a fired expiry event. Stale events from an overwritten
/// activation are ignored. Returns the kind that ended.
pub fn expire(session: &mut GameSession, effect: Effect, event_id: u64) -> Option<PowerUpKind> {
    let slot = match effect {
        Effect::PowerUpExpired => &mut session.power_up,
        Effect::BoostExpired => &mut session.boost,
        _ => return None,
    };
    match slot {
        Some(state) if state.expiry_event == event_id => {
            let kind = state.kind;
            *slot = None;
            log::info!("{kind:?} expired");
            Some(kind)
        }
        _ => None,
    }
}

/// Fire the score boost the first time the score reaches the threshold
pub fn check_score_threshold(
    session: &mut GameSession,
    now: u64,
    scheduler: &mut Scheduler,
    tuning: &Tuning,
) -> bool {
    if session.boost_used || session.score < tuning.score_threshold {
        return false;
    }
    session.boost_used = true;
    log::info!("Score {} reached the boost threshold", session.score);
    activate(session, PowerUpKind::ScoreBoost, now, scheduler, tuning);
    true
}
