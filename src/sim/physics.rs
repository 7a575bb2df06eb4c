//! Arcade physics for a flat 2D field
//!
//! Axis-aligned boxes only. The player lands on solids from above; spawned
//! entities fly in straight lines and never touch terrain.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{BossState, EntityId, EntitySet, PlayerCharacter};
use crate::consts::*;

/// Tolerance when deciding the player was standing on a surface last tick
const LANDING_EPSILON: f32 = 0.5;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }
}

/// Static solids of a stage
#[derive(Debug, Clone, Default)]
pub struct Terrain {
    pub solids: Vec<Aabb>,
}

impl Terrain {
    /// Random ground row with a gap around the centre, plus floating platforms
    pub fn generate(rng: &mut Pcg32) -> Self {
        let tile_half = Vec2::new(TILE_WIDTH / 2.0, TILE_HEIGHT / 2.0);
        let centre = FIELD_WIDTH / 2.0;
        let mut solids = Vec::new();

        for _ in 0..GROUND_TILE_DRAWS {
            let x = rng.random_range(0.0..=FIELD_WIDTH);
            if x < centre - GROUND_GAP_HALF_WIDTH || x > centre + GROUND_GAP_HALF_WIDTH {
                let ground = Vec2::new(x, FIELD_HEIGHT - TILE_HEIGHT);
                solids.push(Aabb::from_center(ground, tile_half));
            }
        }

        for _ in 0..PLATFORM_COUNT {
            let x = rng.random_range(SPAWN_MARGIN..=FIELD_WIDTH - SPAWN_MARGIN);
            let y = rng.random_range(SPAWN_MARGIN..=FIELD_HEIGHT - SPAWN_MARGIN);
            solids.push(Aabb::from_center(Vec2::new(x, y), tile_half));
        }

        log::debug!("Generated terrain with {} solids", solids.len());
        Self { solids }
    }

    /// A single floor spanning the whole field
    pub fn flat() -> Self {
        let floor = Aabb {
            min: Vec2::new(0.0, FIELD_HEIGHT - TILE_HEIGHT * 1.5),
            max: Vec2::new(FIELD_WIDTH, FIELD_HEIGHT - TILE_HEIGHT * 0.5),
        };
        Self {
            solids: vec![floor],
        }
    }

    /// Field with nothing to stand on
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Apply gravity, move the player and land on solids
pub fn step_player(player: &mut PlayerCharacter, terrain: &Terrain, gravity: f32, dt: f32) {
    let half = player.half_extents();
    let prev_bottom = player.pos.y + half.y;

    player.vel.y += gravity * dt;
    player.pos += player.vel * dt;
    player.pos.x = player.pos.x.clamp(half.x, FIELD_WIDTH - half.x);
    player.grounded = false;

    if player.vel.y < 0.0 {
        return;
    }

    let body = Aabb::from_center(player.pos, half);
    let landing = terrain
        .solids
        .iter()
        .filter(|solid| body.overlaps_x(solid))
        .filter(|solid| prev_bottom <= solid.min.y + LANDING_EPSILON && body.max.y >= solid.min.y)
        .map(|solid| solid.min.y)
        .reduce(f32::min);

    if let Some(top) = landing {
        player.pos.y = top - half.y;
        player.vel.y = 0.0;
        player.grounded = true;
    }
}

/// Move entities, finish weapon flights and cull anything off-screen
pub fn step_entities(entities: &mut EntitySet, dt: f32) {
    for entity in entities.iter_mut() {
        entity.pos += entity.vel * dt;
        if let Some(flight) = entity.flight.as_mut() {
            flight.ticks_left = flight.ticks_left.saturating_sub(1);
        }
    }

    entities.retain(|e| {
        let finished = e.flight.is_some_and(|f| f.ticks_left == 0);
        let on_screen = e.pos.x >= -CULL_MARGIN
            && e.pos.x <= FIELD_WIDTH + CULL_MARGIN
            && e.pos.y >= -CULL_MARGIN
            && e.pos.y <= FIELD_HEIGHT + CULL_MARGIN;
        !finished && on_screen
    });
}

/// An overlap reported to the collision resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Player touched a spawned entity
    Player(EntityId),
    /// A thrown weapon reached the boss
    Boss(EntityId),
}

/// Report this tick's overlaps in entity-id order
pub fn detect_contacts(
    player: &PlayerCharacter,
    entities: &EntitySet,
    boss: Option<&BossState>,
) -> Vec<Contact> {
    let player_box = Aabb::from_center(player.pos, player.half_extents());
    let boss_box = boss
        .filter(|b| !b.defeated)
        .map(|b| Aabb::from_center(b.pos, b.half_extents()));

    entities
        .iter()
        .filter_map(|entity| {
            let entity_box = Aabb::from_center(entity.pos, entity.kind.half_extents());
            if entity.is_weapon() {
                boss_box
                    .filter(|b| b.overlaps(&entity_box))
                    .map(|_| Contact::Boss(entity.id))
            } else if player_box.overlaps(&entity_box) {
                Some(Contact::Player(entity.id))
            } else {
                None
            }
        })
        .collect()
}
