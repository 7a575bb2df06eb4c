//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod physics;
pub mod powerup;
pub mod schedule;
pub mod spawner;
pub mod stage;
pub mod state;
pub mod tick;

pub use collision::{Outcome, resolve_contact};
pub use physics::{Aabb, Contact, Terrain};
pub use powerup::{PlayerStats, effective_stats};
pub use schedule::{Effect, ScheduledEvent, Scheduler};
pub use stage::{FrameContext, StageExit, StageState};
pub use state::{
    EntityId, EntityKind, GameEvent, GamePhase, GameSession, GameState, PlayerCharacter,
    PowerUpKind, StageKind, StageTransfer,
};
pub use tick::{TickInput, tick};
