//! Star Dash - A side-scrolling collect-and-dodge arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (stages, spawning, collisions, power-ups)
//! - `tuning`: Data-driven game balance
//! - `audio`: Sound cue selection from simulation events
//! - `ui`: HUD text derived from game state

pub mod audio;
pub mod error;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::TuningError;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const SIM_HZ: u32 = 120;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Visible play field
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Spawns and platforms stay this far from the field edges
    pub const SPAWN_MARGIN: f32 = 100.0;
    /// Entities further than this outside the field are culled
    pub const CULL_MARGIN: f32 = 64.0;

    /// Player sprite is 32x48 at scale 1
    pub const PLAYER_HALF_WIDTH: f32 = 16.0;
    pub const PLAYER_HALF_HEIGHT: f32 = 24.0;
    /// Respawn point
    pub const PLAYER_START_X: f32 = 100.0;
    pub const PLAYER_START_Y: f32 = FIELD_HEIGHT / 2.0;

    /// Ground tiles and platforms share the 400x32 platform sprite
    pub const TILE_WIDTH: f32 = 400.0;
    pub const TILE_HEIGHT: f32 = 32.0;
    pub const GROUND_TILE_DRAWS: u32 = 20;
    /// Ground tiles are not placed this close to the field centre
    pub const GROUND_GAP_HALF_WIDTH: f32 = 100.0;
    pub const PLATFORM_COUNT: u32 = 5;

    /// Boss sits near the right edge, drawn at 2.2x a 64px sprite
    pub const BOSS_X: f32 = FIELD_WIDTH - 100.0;
    pub const BOSS_Y: f32 = FIELD_HEIGHT / 2.0;
    pub const BOSS_HALF_EXTENT: f32 = 70.0;
}

/// Convert a millisecond duration to simulation ticks (rounded up)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u64 {
    (u64::from(ms) * u64::from(consts::SIM_HZ)).div_ceil(1000)
}

/// Format a second count as `m:ss`
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(100), 12);
        assert_eq!(ms_to_ticks(1000), 120);
        assert_eq!(ms_to_ticks(25_000), 3000);
        // Partial ticks round up so a timer never fires early
        assert_eq!(ms_to_ticks(1), 1);
        assert_eq!(ms_to_ticks(0), 0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(180), "3:00");
        assert_eq!(format_clock(179), "2:59");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(0), "0:00");
    }
}
