//! Data-driven game balance
//!
//! Every stage receives its own copy of [`Tuning`]; nothing here is shared
//! mutable state. Power-ups never write back into it, they are applied as
//! multipliers on top (see `sim::powerup`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Gameplay constants, loadable from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Movement ===
    /// Horizontal run speed and projectile speed (px/s)
    pub dude_speed: f32,
    /// Downward acceleration on the player (px/s²)
    pub dude_gravity: f32,
    /// Extra jumps allowed while airborne
    pub max_double_jumps: u32,
    /// Jump impulse is `gravity / jump_divisor`
    pub jump_divisor: f32,

    // === Session ===
    pub starting_lives: u8,
    /// Length of the collection stage
    pub stage_duration_secs: u32,
    /// How long the introduction text stays up
    pub intro_delay_ms: u32,

    // === Spawning ===
    pub collectible_interval_ms: u32,
    pub mushroom_interval_ms: u32,
    pub bullet_interval_ms: u32,
    /// Fall speed of mushrooms (px/s)
    pub mushroom_fall_speed: f32,
    /// Draws below this spawn a sword
    pub sword_chance: f32,
    /// Draws below this (and not a sword) spawn a star
    pub star_chance: f32,
    pub star_points: u32,
    pub sword_points: u32,

    // === Power-ups ===
    pub growth_duration_ms: u32,
    /// Score that triggers the one-off speed boost
    pub score_threshold: u32,
    pub boost_duration_ms: u32,

    // === Boss ===
    pub boss_hit_points: u32,
    /// Score spent per thrown weapon
    pub attack_cost: u32,
    /// Time for a thrown weapon to reach the boss
    pub weapon_flight_ms: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            dude_speed: 300.0,
            dude_gravity: 800.0,
            max_double_jumps: 2,
            jump_divisor: 1.6,

            starting_lives: 3,
            stage_duration_secs: 180,
            intro_delay_ms: 3000,

            collectible_interval_ms: 100,
            mushroom_interval_ms: 6000,
            bullet_interval_ms: 2000,
            mushroom_fall_speed: 100.0,
            sword_chance: 0.2,
            star_chance: 0.6,
            star_points: 1,
            sword_points: 10,

            growth_duration_ms: 25_000,
            score_threshold: 100,
            boost_duration_ms: 10_000,

            boss_hit_points: 50,
            attack_cost: 1,
            weapon_flight_ms: 500,
        }
    }
}

impl Tuning {
    /// Fresh copy of the default balance
    pub fn reset_to_defaults() -> Self {
        Self::default()
    }

    /// Parse and validate tuning JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |field: &'static str, reason: &'static str| -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        };

        if !(0.0..=1.0).contains(&self.sword_chance) {
            return invalid("sword_chance", "must be within [0, 1]");
        }
        if !(self.sword_chance..=1.0).contains(&self.star_chance) {
            return invalid("star_chance", "must be within [sword_chance, 1]");
        }
        if !(1..=3).contains(&self.starting_lives) {
            return invalid("starting_lives", "must be between 1 and 3");
        }
        if self.stage_duration_secs == 0 {
            return invalid("stage_duration_secs", "must be positive");
        }
        if self.jump_divisor <= 0.0 {
            return invalid("jump_divisor", "must be positive");
        }
        if self.dude_speed <= 0.0 || self.dude_gravity <= 0.0 {
            return invalid("dude_speed", "speed and gravity must be positive");
        }
        if self.mushroom_fall_speed <= 0.0 {
            return invalid("mushroom_fall_speed", "must be positive");
        }
        if self.boss_hit_points == 0 {
            return invalid("boss_hit_points", "must be positive");
        }
        if self.attack_cost == 0 {
            return invalid("attack_cost", "must be positive");
        }
        for (field, ms) in [
            ("collectible_interval_ms", self.collectible_interval_ms),
            ("mushroom_interval_ms", self.mushroom_interval_ms),
            ("bullet_interval_ms", self.bullet_interval_ms),
            ("growth_duration_ms", self.growth_duration_ms),
            ("boost_duration_ms", self.boost_duration_ms),
            ("weapon_flight_ms", self.weapon_flight_ms),
        ] {
            if ms == 0 {
                return invalid(field, "must be positive");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
        assert_eq!(Tuning::reset_to_defaults(), Tuning::default());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "dude_speed": 450.0, "boss_hit_points": 5 }"#)
            .expect("valid tuning");
        assert_eq!(tuning.dude_speed, 450.0);
        assert_eq!(tuning.boss_hit_points, 5);
        assert_eq!(tuning.dude_gravity, 800.0);
        assert_eq!(tuning.stage_duration_secs, 180);
    }

    #[test]
    fn test_rejects_unordered_chances() {
        let err = Tuning::from_json(r#"{ "sword_chance": 0.7, "star_chance": 0.6 }"#)
            .expect_err("star_chance below sword_chance");
        assert!(matches!(err, TuningError::Invalid { field: "star_chance", .. }));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = Tuning::from_json(r#"{ "bullet_interval_ms": 0 }"#).expect_err("zero interval");
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "bullet_interval_ms",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_rising_mushrooms() {
        let err = Tuning::from_json(r#"{ "mushroom_fall_speed": -100.0 }"#).expect_err("rising");
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "mushroom_fall_speed",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_free_attacks() {
        let err = Tuning::from_json(r#"{ "attack_cost": 0 }"#).expect_err("free attack");
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "attack_cost",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = Tuning::from_json("{ not json").expect_err("malformed");
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Tuning::load("/definitely/not/here.json").expect_err("missing file");
        assert!(matches!(err, TuningError::Io { .. }));
    }
}
