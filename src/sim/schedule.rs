//! Scheduled events
//!
//! Timers (spawners, countdown, power-up expiry) are entries in a queue keyed
//! by `(fire_at, id)` and polled once per tick, so ordering is deterministic
//! and tests never wait on a clock.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// What happens when a scheduled event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    IntroFinished,
    SpawnCollectible,
    SpawnMushroom,
    SpawnBullet,
    CountdownTick,
    PowerUpExpired,
    BoostExpired,
}

/// An effect due at a given tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub fire_at: u64,
    pub id: u64,
    pub effect: Effect,
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.fire_at, self.id).cmp(&(other.fire_at, other.id))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-queue of pending events
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<ScheduledEvent>>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `effect` for tick `fire_at` and return its event id
    pub fn schedule_at(&mut self, fire_at: u64, effect: Effect) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(Reverse(ScheduledEvent {
            fire_at,
            id,
            effect,
        }));
        id
    }

    pub fn schedule_in(&mut self, now: u64, delay_ticks: u64, effect: Effect) -> u64 {
        self.schedule_at(now + delay_ticks, effect)
    }

    /// Next event due at or before `now`, earliest first
    pub fn pop_due(&mut self, now: u64) -> Option<ScheduledEvent> {
        match self.queue.peek() {
            Some(Reverse(event)) if event.fire_at <= now => self.queue.pop().map(|r| r.0),
            _ => None,
        }
    }

    /// Tick of the earliest pending event
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|r| r.0.fire_at)
    }

    /// Drop every pending event (stage exit)
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, effect: Effect) -> bool {
        self.queue.iter().any(|r| r.0.effect == effect)
    }
}
