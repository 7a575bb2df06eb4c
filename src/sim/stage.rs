//! Per-stage update loop
//!
//! One call to [`StageState::update`] is one simulation tick. The order
//! within a tick is fixed: scheduled events, input, physics, collisions,
//! power-up threshold, fall check, then the exit check after every mutation.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::collision;
use super::physics::{self, Terrain};
use super::powerup::{self, PlayerStats};
use super::schedule::{Effect, Scheduler};
use super::spawner;
use super::state::{
    Animation, BossState, EntityKind, EntitySet, GameEvent, GamePhase, GameSession,
    PlayerCharacter, PowerUpKind, StageKind,
};
use super::tick::TickInput;
use crate::consts::*;
use crate::ms_to_ticks;
use crate::tuning::Tuning;

/// Shared services borrowed by a stage for one tick
pub struct FrameContext<'a> {
    pub tuning: &'a Tuning,
    pub rng: &'a mut Pcg32,
    pub scheduler: &'a mut Scheduler,
    pub events: &'a mut Vec<GameEvent>,
    /// Current tick
    pub now: u64,
    pub dt: f32,
}

/// Why a stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageExit {
    /// Countdown reached zero
    TimeUp,
    /// Lives reached zero
    Defeated,
    /// Boss hit points reached zero
    BossDefeated,
}

impl StageExit {
    pub fn next_phase(self) -> GamePhase {
        match self {
            StageExit::TimeUp => GamePhase::BossStage,
            StageExit::Defeated => GamePhase::GameOver,
            StageExit::BossDefeated => GamePhase::Victory,
        }
    }
}

/// Turns a held button into single presses
#[derive(Debug, Clone, Copy, Default)]
pub struct PressEdge {
    held: bool,
}

impl PressEdge {
    /// True only on the tick the button goes down
    pub fn press(&mut self, down: bool) -> bool {
        let pressed = down && !self.held;
        self.held = down;
        pressed
    }
}

/// Everything that lives for the duration of one stage
#[derive(Debug, Clone)]
pub struct StageState {
    pub kind: StageKind,
    pub session: GameSession,
    pub player: PlayerCharacter,
    pub entities: EntitySet,
    pub boss: Option<BossState>,
    pub terrain: Terrain,
    jump_edge: PressEdge,
    attack_edge: PressEdge,
    exit: Option<StageExit>,
}

impl StageState {
    /// Build a stage and queue its timers
    pub fn enter(
        kind: StageKind,
        session: GameSession,
        terrain: Terrain,
        cx: &mut FrameContext,
    ) -> Self {
        spawner::schedule_spawners(cx.scheduler, kind, cx.now, cx.tuning);
        if kind == StageKind::Play {
            cx.scheduler
                .schedule_in(cx.now, ms_to_ticks(1000), Effect::CountdownTick);
        }
        let boss = (kind == StageKind::Boss).then(|| BossState::new(cx.tuning.boss_hit_points));

        Self {
            kind,
            session,
            player: PlayerCharacter::default(),
            entities: EntitySet::default(),
            boss,
            terrain,
            jump_edge: PressEdge::default(),
            attack_edge: PressEdge::default(),
            exit: None,
        }
    }

    /// Exit condition latched by a previous update
    pub fn exit(&self) -> Option<StageExit> {
        self.exit
    }

    /// Advance one tick. Returns the exit condition on the tick it is first met.
    pub fn update(&mut self, input: &TickInput, cx: &mut FrameContext) -> Option<StageExit> {
        if self.exit.is_some() {
            return None;
        }

        self.run_scheduled(cx);

        let stats = self.apply_stats(cx.tuning);
        self.apply_movement(input, &stats);

        if self.jump_edge.press(input.jump) {
            self.try_jump(&stats, cx);
        }
        if self.attack_edge.press(input.attack) && self.kind == StageKind::Boss {
            self.throw_weapon(cx);
        }

        physics::step_player(&mut self.player, &self.terrain, stats.gravity, cx.dt);
        if self.player.grounded {
            self.player.double_jumps = 0;
        }
        physics::step_entities(&mut self.entities, cx.dt);

        let contacts = physics::detect_contacts(&self.player, &self.entities, self.boss.as_ref());
        for contact in contacts {
            collision::resolve_contact(self, contact, cx);
        }

        if self.kind == StageKind::Play
            && powerup::check_score_threshold(&mut self.session, cx.now, cx.scheduler, cx.tuning)
        {
            cx.events
                .push(GameEvent::PowerUpActivated(PowerUpKind::ScoreBoost));
        }
        // Pickups this tick take effect before anyone reads the state
        self.apply_stats(cx.tuning);

        self.check_bounds(cx);

        self.exit = self.evaluate_exit();
        if let Some(exit) = self.exit {
            log::info!("{:?} stage ended: {exit:?}", self.kind);
        }
        self.exit
    }

    fn run_scheduled(&mut self, cx: &mut FrameContext) {
        while let Some(event) = cx.scheduler.pop_due(cx.now) {
            match event.effect {
                Effect::SpawnCollectible | Effect::SpawnMushroom | Effect::SpawnBullet => {
                    self.spawn(event.effect, cx);
                    if let Some(interval) = spawner::interval_ticks(event.effect, cx.tuning) {
                        cx.scheduler
                            .schedule_at(event.fire_at + interval, event.effect);
                    }
                }
                Effect::CountdownTick => {
                    self.session.timer.tick();
                    let remaining = self.session.timer.remaining();
                    cx.events.push(GameEvent::TimerTick(remaining));
                    if remaining > 0 {
                        cx.scheduler
                            .schedule_at(event.fire_at + ms_to_ticks(1000), Effect::CountdownTick);
                    }
                }
                Effect::PowerUpExpired | Effect::BoostExpired => {
                    if let Some(kind) = powerup::expire(&mut self.session, event.effect, event.id) {
                        cx.events.push(GameEvent::PowerUpExpired(kind));
                    }
                }
                Effect::IntroFinished => {
                    log::debug!("Ignoring stale intro event at tick {}", cx.now);
                }
            }
        }
    }

    fn spawn(&mut self, effect: Effect, cx: &mut FrameContext) {
        let world_speed = powerup::effective_stats(cx.tuning, &self.session).world_speed;
        let spawned = match effect {
            Effect::SpawnCollectible => {
                spawner::spawn_collectible(&mut self.entities, cx.rng, cx.tuning, world_speed)
            }
            Effect::SpawnMushroom => {
                let id = spawner::spawn_mushroom(&mut self.entities, cx.rng, cx.tuning);
                Some((id, EntityKind::Mushroom))
            }
            Effect::SpawnBullet => {
                let id = spawner::spawn_bullet(&mut self.entities, cx.rng, world_speed);
                Some((id, EntityKind::Bullet))
            }
            _ => None,
        };
        if let Some((id, kind)) = spawned {
            log::debug!("Spawned {kind:?} #{id}");
            cx.events.push(GameEvent::Spawned { id, kind });
        }
    }

    /// Bring size and run speed in line with the active power-ups
    fn apply_stats(&mut self, tuning: &Tuning) -> PlayerStats {
        let stats = powerup::effective_stats(tuning, &self.session);
        if stats.size_scale != self.player.size_scale {
            let old_half = self.player.half_extents();
            self.player.size_scale = stats.size_scale;
            // Keep the feet where they were
            self.player.pos.y -= self.player.half_extents().y - old_half.y;
        }
        if self.player.vel.x != 0.0 {
            self.player.vel.x = self.player.vel.x.signum() * stats.speed;
        }
        stats
    }

    fn apply_movement(&mut self, input: &TickInput, stats: &PlayerStats) {
        let (vx, animation) = if input.left {
            (-stats.speed, Animation::Left)
        } else if input.right {
            (stats.speed, Animation::Right)
        } else {
            (0.0, Animation::Turn)
        };
        self.player.vel.x = vx;
        self.player.animation = animation;
    }

    /// Jump from the ground, or spend a double jump in the air
    fn try_jump(&mut self, stats: &PlayerStats, cx: &mut FrameContext) -> bool {
        let airborne = !self.player.grounded;
        if airborne && self.player.double_jumps >= cx.tuning.max_double_jumps {
            return false;
        }
        self.player.vel.y = -stats.world_gravity / cx.tuning.jump_divisor;
        if airborne {
            self.player.double_jumps += 1;
        }
        cx.events.push(GameEvent::Jumped { airborne });
        true
    }

    /// Spend score to throw a sword at the boss
    fn throw_weapon(&mut self, cx: &mut FrameContext) -> bool {
        let Some(boss) = self.boss.as_ref().filter(|b| !b.defeated) else {
            return false;
        };
        if !self.session.spend(cx.tuning.attack_cost) {
            return false;
        }

        let flight_secs = cx.tuning.weapon_flight_ms as f32 / 1000.0;
        let vel = Vec2::new((boss.pos.x - self.player.pos.x) / flight_secs, 0.0);
        let flight_ticks = ms_to_ticks(cx.tuning.weapon_flight_ms);
        let id = self
            .entities
            .spawn_weapon(self.player.pos, vel, flight_ticks);

        log::debug!("Threw weapon #{id}, score {}", self.session.score);
        cx.events.push(GameEvent::WeaponThrown);
        cx.events.push(GameEvent::ScoreChanged(self.session.score));
        true
    }

    /// Falling below the field costs a life; respawn if any remain
    fn check_bounds(&mut self, cx: &mut FrameContext) {
        if self.player.pos.y <= FIELD_HEIGHT || self.session.lives == 0 {
            return;
        }
        let lives_left = self.session.lose_life();
        log::debug!("Fell off the world, {lives_left} lives left");
        cx.events.push(GameEvent::FellOffWorld);
        cx.events.push(GameEvent::LivesChanged(lives_left));
        if lives_left > 0 {
            self.player.respawn();
            cx.events.push(GameEvent::Respawned);
        }
    }

    fn evaluate_exit(&self) -> Option<StageExit> {
        if self.session.lives == 0 {
            Some(StageExit::Defeated)
        } else if self.boss.as_ref().is_some_and(|b| b.defeated) {
            Some(StageExit::BossDefeated)
        } else if self.kind == StageKind::Play && self.session.timer.is_expired() {
            Some(StageExit::TimeUp)
        } else {
            None
        }
    }
}
