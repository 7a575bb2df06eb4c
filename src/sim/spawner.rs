//! Entity spawning on fixed schedules

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::schedule::{Effect, Scheduler};
use super::state::{EntityId, EntityKind, EntitySet, StageKind};
use crate::consts::*;
use crate::ms_to_ticks;
use crate::tuning::Tuning;

/// Map a uniform draw in `[0, 1)` to the collectible it spawns
pub fn classify_collectible(r: f32, tuning: &Tuning) -> Option<EntityKind> {
    if r < tuning.sword_chance {
        Some(EntityKind::Sword)
    } else if r < tuning.star_chance {
        Some(EntityKind::Star)
    } else {
        None
    }
}

/// Random height inside the vertical play area
fn spawn_y(rng: &mut Pcg32) -> f32 {
    rng.random_range(SPAWN_MARGIN..=FIELD_HEIGHT - SPAWN_MARGIN)
}

/// Maybe spawn a star or sword at the right edge, moving left
pub fn spawn_collectible(
    entities: &mut EntitySet,
    rng: &mut Pcg32,
    tuning: &Tuning,
    world_speed: f32,
) -> Option<(EntityId, EntityKind)> {
    let kind = classify_collectible(rng.random::<f32>(), tuning)?;
    let pos = Vec2::new(FIELD_WIDTH, spawn_y(rng));
    let id = entities.spawn(kind, pos, Vec2::new(-world_speed, 0.0));
    Some((id, kind))
}

/// Drop a mushroom from the top edge
pub fn spawn_mushroom(entities: &mut EntitySet, rng: &mut Pcg32, tuning: &Tuning) -> EntityId {
    let x = rng.random_range(SPAWN_MARGIN..=FIELD_WIDTH - SPAWN_MARGIN);
    entities.spawn(
        EntityKind::Mushroom,
        Vec2::new(x, 0.0),
        Vec2::new(0.0, tuning.mushroom_fall_speed),
    )
}

/// Fire a bullet from the right edge toward the player side
pub fn spawn_bullet(entities: &mut EntitySet, rng: &mut Pcg32, world_speed: f32) -> EntityId {
    let pos = Vec2::new(FIELD_WIDTH, spawn_y(rng));
    entities.spawn(EntityKind::Bullet, pos, Vec2::new(-world_speed, 0.0))
}

/// Repeat interval of a spawn effect
pub fn interval_ticks(effect: Effect, tuning: &Tuning) -> Option<u64> {
    let ms = match effect {
        Effect::SpawnCollectible => tuning.collectible_interval_ms,
        Effect::SpawnMushroom => tuning.mushroom_interval_ms,
        Effect::SpawnBullet => tuning.bullet_interval_ms,
        _ => return None,
    };
    Some(ms_to_ticks(ms))
}

/// Spawn schedules that run during a stage
pub fn spawn_effects(kind: StageKind) -> &'static [Effect] {
    match kind {
        StageKind::Play => &[
            Effect::SpawnCollectible,
            Effect::SpawnMushroom,
            Effect::SpawnBullet,
        ],
        StageKind::Boss => &[Effect::SpawnBullet],
    }
}

/// Queue the first firing of every spawner for this stage
pub fn schedule_spawners(scheduler: &mut Scheduler, kind: StageKind, now: u64, tuning: &Tuning) {
    for &effect in spawn_effects(kind) {
        if let Some(interval) = interval_ticks(effect, tuning) {
            scheduler.schedule_in(now, interval, effect);
        }
    }
}
