//! Game state and core simulation types
//!
//! `GameSession` is the only record that outlives a stage; everything else
//! here is created on stage entry and dropped on stage exit.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::physics::Terrain;
use super::schedule::{Effect, Scheduler};
use super::stage::{FrameContext, StageState};
use crate::consts::*;
use crate::ms_to_ticks;
use crate::tuning::Tuning;

/// Top-level phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Informational text, no gameplay
    Introduction,
    /// Timed collection stage
    PlayStage,
    /// Boss fight
    BossStage,
    /// Player ran out of lives
    GameOver,
    /// Boss defeated
    Victory,
}

impl GamePhase {
    /// Terminal phases only leave through a full restart
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }

    /// Forward transitions of the state machine
    pub fn can_transition_to(self, next: GamePhase) -> bool {
        matches!(
            (self, next),
            (GamePhase::Introduction, GamePhase::PlayStage)
                | (GamePhase::PlayStage, GamePhase::BossStage)
                | (GamePhase::PlayStage, GamePhase::GameOver)
                | (GamePhase::BossStage, GamePhase::GameOver)
                | (GamePhase::BossStage, GamePhase::Victory)
        )
    }
}

/// Which gameplay stage a `StageState` is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageKind {
    Play,
    Boss,
}

impl StageKind {
    pub fn phase(self) -> GamePhase {
        match self {
            StageKind::Play => GamePhase::PlayStage,
            StageKind::Boss => GamePhase::BossStage,
        }
    }
}

/// Animation the player sprite should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Animation {
    Left,
    #[default]
    Turn,
    Right,
}

/// The player-controlled character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCharacter {
    /// Centre of the sprite
    pub pos: Vec2,
    pub vel: Vec2,
    pub size_scale: f32,
    /// Jumps taken while airborne since last touching ground
    pub double_jumps: u32,
    pub grounded: bool,
    pub animation: Animation,
}

impl Default for PlayerCharacter {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            vel: Vec2::ZERO,
            size_scale: 1.0,
            double_jumps: 0,
            grounded: false,
            animation: Animation::Turn,
        }
    }
}

impl PlayerCharacter {
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(PLAYER_HALF_WIDTH, PLAYER_HALF_HEIGHT) * self.size_scale
    }

    /// Put the player back at the start point, keeping the current scale
    pub fn respawn(&mut self) {
        *self = Self {
            size_scale: self.size_scale,
            ..Self::default()
        };
    }
}

pub type EntityId = u32;

/// What a spawned entity is. Decided at spawn time, never from its sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Worth `star_points`
    Star,
    /// Worth `sword_points` in the play stage; the player's weapon in the boss stage
    Sword,
    /// Grants the growth power-up
    Mushroom,
    /// Costs a life
    Bullet,
}

impl EntityKind {
    /// Collision box half size
    pub fn half_extents(self) -> Vec2 {
        match self {
            EntityKind::Star => Vec2::new(12.0, 11.0),
            EntityKind::Sword => Vec2::new(16.0, 16.0),
            EntityKind::Mushroom => Vec2::new(16.0, 16.0),
            EntityKind::Bullet => Vec2::new(8.0, 8.0),
        }
    }
}

/// A thrown weapon in flight toward the boss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponFlight {
    /// Ticks until the throw finishes and the weapon disappears
    pub ticks_left: u64,
}

/// A non-player entity taking part in collision checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnedEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Set for weapons launched by the player
    pub flight: Option<WeaponFlight>,
}

impl SpawnedEntity {
    pub fn is_weapon(&self) -> bool {
        self.flight.is_some()
    }
}

/// Live entities of one stage, in ascending id order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySet {
    entities: Vec<SpawnedEntity>,
    next_id: EntityId,
}

impl Default for EntitySet {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }
}

impl EntitySet {
    /// Add an entity and return its id
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2) -> EntityId {
        self.insert(kind, pos, vel, None)
    }

    /// Add a player weapon that lives for `flight_ticks`
    pub fn spawn_weapon(&mut self, pos: Vec2, vel: Vec2, flight_ticks: u64) -> EntityId {
        let flight = WeaponFlight {
            ticks_left: flight_ticks,
        };
        self.insert(EntityKind::Sword, pos, vel, Some(flight))
    }

    fn insert(
        &mut self,
        kind: EntityKind,
        pos: Vec2,
        vel: Vec2,
        flight: Option<WeaponFlight>,
    ) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(SpawnedEntity {
            id,
            kind,
            pos,
            vel,
            flight,
        });
        id
    }

    /// Remove an entity. Removing an id twice is a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<SpawnedEntity> {
        let idx = self.entities.binary_search_by_key(&id, |e| e.id).ok()?;
        Some(self.entities.remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&SpawnedEntity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|idx| &self.entities[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnedEntity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SpawnedEntity> {
        self.entities.iter_mut()
    }

    /// Drop every entity for which `keep` returns false
    pub fn retain(&mut self, keep: impl FnMut(&SpawnedEntity) -> bool) {
        self.entities.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }
}

/// Timed stat modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// From a mushroom: bigger, floatier, faster
    Growth,
    /// From crossing the score threshold: the whole world speeds up
    ScoreBoost,
}

/// An active power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpState {
    pub kind: PowerUpKind,
    /// Tick at which the effect ends
    pub expires_at: u64,
    /// Scheduler event that ends this activation
    pub expiry_event: u64,
}

/// The boss of the final stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossState {
    pub pos: Vec2,
    pub hit_points: u32,
    /// Latched the first time hit points reach zero
    pub defeated: bool,
}

impl BossState {
    pub fn new(hit_points: u32) -> Self {
        Self {
            pos: Vec2::new(BOSS_X, BOSS_Y),
            hit_points,
            defeated: false,
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::splat(BOSS_HALF_EXTENT)
    }
}

/// Whole-second countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTimer {
    remaining: u32,
}

impl StageTimer {
    pub fn new(secs: u32) -> Self {
        Self { remaining: secs }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Count down one second. Returns true on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

/// Score, lives and effects of the current run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub score: u32,
    pub lives: u8,
    pub timer: StageTimer,
    /// Mushroom power-up (at most one; a new pickup overwrites it)
    pub power_up: Option<PowerUpState>,
    /// Score-threshold boost
    pub boost: Option<PowerUpState>,
    /// The threshold boost fires at most once per session
    pub boost_used: bool,
}

impl GameSession {
    /// Fresh session at the start of the play stage
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            lives: tuning.starting_lives,
            timer: StageTimer::new(tuning.stage_duration_secs),
            power_up: None,
            boost: None,
            boost_used: false,
        }
    }

    /// Session continuing into the boss stage
    pub fn from_transfer(transfer: StageTransfer) -> Self {
        Self {
            score: transfer.score(),
            lives: transfer.lives(),
            timer: StageTimer::new(0),
            power_up: None,
            boost: None,
            boost_used: false,
        }
    }

    /// Spend points, never going below zero. Returns false if unaffordable.
    pub fn spend(&mut self, cost: u32) -> bool {
        if self.score == 0 || self.score < cost {
            return false;
        }
        self.score -= cost;
        true
    }

    /// Lose one life (saturating) and return how many are left
    pub fn lose_life(&mut self) -> u8 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}

/// Score and lives handed from one stage to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransfer {
    score: u32,
    lives: u8,
}

impl StageTransfer {
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }
}

impl From<&GameSession> for StageTransfer {
    fn from(session: &GameSession) -> Self {
        Self {
            score: session.score,
            lives: session.lives,
        }
    }
}

/// Something observable that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    Spawned { id: EntityId, kind: EntityKind },
    Collected { kind: EntityKind, points: u32 },
    ScoreChanged(u32),
    LivesChanged(u8),
    Jumped { airborne: bool },
    PlayerHit,
    FellOffWorld,
    Respawned,
    PowerUpActivated(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    WeaponThrown,
    BossDamaged { hit_points: u32 },
    BossDefeated,
    /// Lives reached zero
    Defeated,
    TimerTick(u32),
}

/// Complete game state
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    /// Current phase
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Active stage, present only in `PlayStage` and `BossStage`
    pub stage: Option<StageState>,
    /// Score and lives the run ended with
    pub final_result: Option<StageTransfer>,
    pub scheduler: Scheduler,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a new game in the introduction phase
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            tuning,
            phase: GamePhase::Introduction,
            time_ticks: 0,
            stage: None,
            final_result: None,
            scheduler: Scheduler::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        let delay = ms_to_ticks(state.tuning.intro_delay_ms);
        state
            .scheduler
            .schedule_in(0, delay, Effect::IntroFinished);
        state
    }

    /// Discard everything and start over from the introduction
    pub fn restart(&mut self, seed: u64) {
        log::info!("Restarting with seed {seed}");
        let tuning = self.tuning.clone();
        *self = Self::new(seed, tuning);
    }

    /// Session of the active stage
    pub fn session(&self) -> Option<&GameSession> {
        self.stage.as_ref().map(|s| &s.session)
    }

    /// Events raised since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move to `to` if the edge exists. Cancels all pending timers, so
    /// nothing scheduled by the old phase fires in the new one.
    pub fn transition(&mut self, to: GamePhase) -> bool {
        let from = self.phase;
        if !from.can_transition_to(to) {
            log::warn!("Ignoring transition {from:?} -> {to:?}");
            return false;
        }

        self.scheduler.clear();
        let previous = self.stage.take().map(|s| StageTransfer::from(&s.session));

        match to {
            GamePhase::PlayStage => {
                let terrain = Terrain::generate(&mut self.rng);
                self.enter_stage(StageKind::Play, GameSession::new(&self.tuning), terrain);
            }
            GamePhase::BossStage => {
                let transfer = previous
                    .unwrap_or_else(|| StageTransfer::from(&GameSession::new(&self.tuning)));
                let terrain = Terrain::generate(&mut self.rng);
                self.enter_stage(StageKind::Boss, GameSession::from_transfer(transfer), terrain);
            }
            GamePhase::GameOver | GamePhase::Victory => {
                self.final_result = previous;
            }
            GamePhase::Introduction => {}
        }

        self.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
        log::info!("Phase {from:?} -> {to:?} at tick {}", self.time_ticks);
        true
    }

    fn enter_stage(&mut self, kind: StageKind, session: GameSession, terrain: Terrain) {
        let mut cx = FrameContext {
            tuning: &self.tuning,
            rng: &mut self.rng,
            scheduler: &mut self.scheduler,
            events: &mut self.events,
            now: self.time_ticks,
            dt: SIM_DT,
        };
        self.stage = Some(StageState::enter(kind, session, terrain, &mut cx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use GamePhase::*;
        let all = [Introduction, PlayStage, BossStage, GameOver, Victory];
        let allowed: Vec<_> = all
            .iter()
            .flat_map(|&a| all.iter().map(move |&b| (a, b)))
            .filter(|(a, b)| a.can_transition_to(*b))
            .collect();
        assert_eq!(
            allowed,
            vec![
                (Introduction, PlayStage),
                (PlayStage, BossStage),
                (PlayStage, GameOver),
                (BossStage, GameOver),
                (BossStage, Victory),
            ]
        );
        assert!(GameOver.is_terminal() && Victory.is_terminal());
    }

    #[test]
    fn test_entity_ids_unique_and_removal_idempotent() {
        let mut set = EntitySet::default();
        let a = set.spawn(EntityKind::Star, Vec2::ZERO, Vec2::ZERO);
        let b = set.spawn(EntityKind::Bullet, Vec2::ZERO, Vec2::ZERO);
        assert!(b > a);
        assert!(set.remove(a).is_some());
        assert!(set.remove(a).is_none());
        let c = set.spawn(EntityKind::Star, Vec2::ZERO, Vec2::ZERO);
        assert!(c > b, "ids are never reused");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_spend_floor() {
        let mut session = GameSession::new(&Tuning::default());
        assert!(!session.spend(1));
        session.score = 2;
        assert!(session.spend(1));
        assert!(!session.spend(5));
        assert_eq!(session.score, 1);
    }

    #[test]
    fn test_timer_never_negative() {
        let mut timer = StageTimer::new(2);
        assert!(!timer.tick());
        assert!(timer.tick());
        assert!(!timer.tick());
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn test_transfer_carries_score_and_lives() {
        let mut session = GameSession::new(&Tuning::default());
        session.score = 42;
        session.lives = 2;
        session.boost_used = true;
        let boss = GameSession::from_transfer(StageTransfer::from(&session));
        assert_eq!((boss.score, boss.lives), (42, 2));
        assert!(boss.power_up.is_none() && boss.boost.is_none());
    }

    #[test]
    fn test_new_game_waits_in_introduction() {
        let state = GameState::new(1, Tuning::default());
        assert_eq!(state.phase, GamePhase::Introduction);
        assert!(state.stage.is_none());
        assert_eq!(state.scheduler.next_due(), Some(360));
    }

    #[test]
    fn test_invalid_transition_ignored() {
        let mut state = GameState::new(1, Tuning::default());
        assert!(!state.transition(GamePhase::BossStage));
        assert!(!state.transition(GamePhase::Victory));
        assert_eq!(state.phase, GamePhase::Introduction);
        assert!(state.events().is_empty());
    }
}
