//! Collision response
//!
//! Each reported contact applies exactly one outcome and consumes the entity
//! involved. Contacts are resolved in the order physics reports them.

use super::physics::Contact;
use super::powerup;
use super::stage::{FrameContext, StageState};
use super::state::{EntityKind, GameEvent, PowerUpKind, StageKind};

/// Result of resolving one contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Collected { kind: EntityKind, points: u32 },
    PoweredUp(PowerUpKind),
    PlayerHit { lives_left: u8 },
    BossHit { hit_points: u32 },
    BossDefeated,
    /// The entity was already consumed or culled earlier
    Missing,
}

/// Apply the effect of a single contact
pub fn resolve_contact(stage: &mut StageState, contact: Contact, cx: &mut FrameContext) -> Outcome {
    match contact {
        Contact::Player(id) => match stage.entities.remove(id) {
            Some(entity) => player_contact(stage, entity.kind, cx),
            None => Outcome::Missing,
        },
        Contact::Boss(id) => match stage.entities.remove(id) {
            Some(_) => boss_contact(stage, cx),
            None => Outcome::Missing,
        },
    }
}

fn player_contact(stage: &mut StageState, kind: EntityKind, cx: &mut FrameContext) -> Outcome {
    let session = &mut stage.session;
    match kind {
        EntityKind::Star | EntityKind::Sword => {
            let points = match kind {
                EntityKind::Star => cx.tuning.star_points,
                _ => cx.tuning.sword_points,
            };
            session.score = session.score.saturating_add(points);
            log::debug!("Collected {kind:?} (+{points}), score {}", session.score);
            cx.events.push(GameEvent::Collected { kind, points });
            cx.events.push(GameEvent::ScoreChanged(session.score));
            Outcome::Collected { kind, points }
        }
        EntityKind::Mushroom => {
            powerup::activate(session, PowerUpKind::Growth, cx.now, cx.scheduler, cx.tuning);
            cx.events.push(GameEvent::PowerUpActivated(PowerUpKind::Growth));
            Outcome::PoweredUp(PowerUpKind::Growth)
        }
        EntityKind::Bullet => {
            let had_lives = session.lives > 0;
            let lives_left = session.lose_life();
            log::debug!("Hit by bullet, {lives_left} lives left");
            cx.events.push(GameEvent::PlayerHit);
            cx.events.push(GameEvent::LivesChanged(lives_left));
            // The boss stage goes straight to game over without a defeat cue
            if had_lives && lives_left == 0 && stage.kind == StageKind::Play {
                cx.events.push(GameEvent::Defeated);
            }
            Outcome::PlayerHit { lives_left }
        }
    }
}

fn boss_contact(stage: &mut StageState, cx: &mut FrameContext) -> Outcome {
    let Some(boss) = stage.boss.as_mut() else {
        return Outcome::Missing;
    };
    if boss.defeated {
        return Outcome::Missing;
    }

    boss.hit_points = boss.hit_points.saturating_sub(1);
    cx.events.push(GameEvent::BossDamaged {
        hit_points: boss.hit_points,
    });

    if boss.hit_points == 0 {
        boss.defeated = true;
        log::info!("Boss defeated");
        cx.events.push(GameEvent::BossDefeated);
        Outcome::BossDefeated
    } else {
        Outcome::BossHit {
            hit_points: boss.hit_points,
        }
    }
}
