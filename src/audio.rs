//! Sound cue selection
//!
//! The simulation never plays sounds itself. `AudioManager` watches the
//! event stream and decides which cue to fire and how loud. On native builds
//! playback is a log line; a real mixer would hook in at [`AudioManager::play`].

use crate::sim::{EntityKind, GameEvent, GamePhase, PowerUpKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Star or sword collected
    Coin,
    /// Any jump, ground or air
    Jump,
    /// Growth power-up wore off
    PowerDown,
    /// Lost the last life in the play stage
    Grunt,
    /// Play stage music (looped)
    Theme,
    /// Boss stage music (looped)
    BossTheme,
    /// Boss defeated
    Victory,
}

impl SoundEffect {
    pub fn is_music(self) -> bool {
        matches!(self, SoundEffect::Theme | SoundEffect::BossTheme)
    }
}

/// A cue ready to hand to the mixer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub effect: SoundEffect,
    pub volume: f32,
}

/// Audio manager for the game
#[derive(Debug)]
pub struct AudioManager {
    master_volume: f32,
    muted: bool,
    /// Currently looping track
    music: Option<SoundEffect>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            master_volume: 1.0,
            muted: false,
            music: None,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn music(&self) -> Option<SoundEffect> {
        self.music
    }

    /// Pick the cue for an event, if it has one
    pub fn cue_for(event: &GameEvent) -> Option<Cue> {
        let cue = |effect, volume| Some(Cue { effect, volume });
        match event {
            GameEvent::Collected {
                kind: EntityKind::Star,
                ..
            } => cue(SoundEffect::Coin, 0.5),
            GameEvent::Collected {
                kind: EntityKind::Sword,
                ..
            } => cue(SoundEffect::Coin, 1.0),
            GameEvent::Jumped { .. } => cue(SoundEffect::Jump, 0.5),
            GameEvent::PowerUpExpired(PowerUpKind::Growth) => cue(SoundEffect::PowerDown, 1.0),
            GameEvent::Defeated => cue(SoundEffect::Grunt, 1.0),
            GameEvent::PhaseChanged { to, .. } => match to {
                GamePhase::PlayStage => cue(SoundEffect::Theme, 0.5),
                GamePhase::BossStage => cue(SoundEffect::BossTheme, 0.5),
                GamePhase::Victory => cue(SoundEffect::Victory, 1.0),
                _ => None,
            },
            _ => None,
        }
    }

    /// React to one simulation event. Returns the cue that was played.
    pub fn handle(&mut self, event: &GameEvent) -> Option<Cue> {
        if let GameEvent::PhaseChanged { to, .. } = event {
            // Each phase starts in silence; stage music replaces it below
            if let Some(track) = self.music.take() {
                log::debug!("Stopping {track:?}");
            }
            if to.is_terminal() {
                log::debug!("Music off for {to:?}");
            }
        }

        let cue = Self::cue_for(event)?;
        self.play(cue)
    }

    /// Play a cue at the current master volume
    pub fn play(&mut self, cue: Cue) -> Option<Cue> {
        let volume = if self.muted {
            0.0
        } else {
            cue.volume * self.master_volume
        };
        if cue.effect.is_music() {
            self.music = Some(cue.effect);
        }
        if volume <= 0.0 {
            return None;
        }

        let played = Cue {
            effect: cue.effect,
            volume,
        };
        log::debug!("Sound {:?} at volume {volume:.2}", cue.effect);
        Some(played)
    }
}
