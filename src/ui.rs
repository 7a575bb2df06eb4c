//! HUD text derived from game state

use serde::Serialize;

use crate::format_clock;
use crate::sim::{GamePhase, GameState};
use crate::tuning::Tuning;

/// Everything the overlay shows for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hud {
    pub score: String,
    pub lives: String,
    /// Countdown, play stage only
    pub timer: Option<String>,
    /// Boss stage only
    pub boss_hp: Option<String>,
    /// Centred message for non-gameplay phases
    pub banner: Option<String>,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        let (score, lives) = match (state.session(), state.final_result) {
            (Some(session), _) => (session.score, session.lives),
            (None, Some(result)) => (result.score(), result.lives()),
            (None, None) => (0, state.tuning.starting_lives),
        };

        let stage = state.stage.as_ref();
        let timer = match state.phase {
            GamePhase::PlayStage => stage.map(|s| format_clock(s.session.timer.remaining())),
            _ => None,
        };
        let boss_hp = stage
            .and_then(|s| s.boss.as_ref())
            .map(|boss| format!("Boss HP: {}", boss.hit_points));

        Self {
            score: score.to_string(),
            lives: lives.to_string(),
            timer,
            boss_hp,
            banner: banner(state.phase, &state.tuning),
        }
    }
}

fn banner(phase: GamePhase, tuning: &Tuning) -> Option<String> {
    match phase {
        GamePhase::Introduction => Some(intro_text(tuning.stage_duration_secs)),
        GamePhase::GameOver => Some("Game over - restart to play again".to_string()),
        GamePhase::Victory => Some("Boss defeated!".to_string()),
        GamePhase::PlayStage | GamePhase::BossStage => None,
    }
}

fn intro_text(secs: u32) -> String {
    let limit = match secs {
        60 => "1 min".to_string(),
        s if s % 60 == 0 => format!("{} mins", s / 60),
        s => format_clock(s),
    };
    format!("You have {limit} to collect as many points as possible")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::ms_to_ticks;
    use crate::sim::{TickInput, tick};

    #[test]
    fn test_intro_banner() {
        let state = GameState::new(1, Tuning::default());
        let hud = Hud::from_state(&state);
        assert_eq!(
            hud.banner.as_deref(),
            Some("You have 3 mins to collect as many points as possible")
        );
        assert_eq!(hud.score, "0");
        assert_eq!(hud.lives, "3");
        assert_eq!(hud.timer, None);
        assert_eq!(intro_text(90), "You have 1:30 to collect as many points as possible");
    }

    #[test]
    fn test_play_stage_hud() {
        let tuning = Tuning::default();
        let intro = ms_to_ticks(tuning.intro_delay_ms);
        let mut state = GameState::new(1, tuning);
        for _ in 0..intro {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let hud = Hud::from_state(&state);
        assert_eq!(hud.timer.as_deref(), Some("3:00"));
        assert_eq!(hud.boss_hp, None);
        assert_eq!(hud.banner, None);

        assert!(state.transition(GamePhase::BossStage));
        let hud = Hud::from_state(&state);
        assert_eq!(hud.timer, None);
        assert_eq!(hud.boss_hp.as_deref(), Some("Boss HP: 50"));
    }

    #[test]
    fn test_final_result_shown_after_game_over() {
        let tuning = Tuning::default();
        let intro = ms_to_ticks(tuning.intro_delay_ms);
        let mut state = GameState::new(1, tuning);
        for _ in 0..intro {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        if let Some(stage) = state.stage.as_mut() {
            stage.session.score = 17;
            stage.session.lives = 0;
        }
        assert!(state.transition(GamePhase::GameOver));
        let hud = Hud::from_state(&state);
        assert_eq!(hud.score, "17");
        assert_eq!(hud.lives, "0");
        assert!(hud.banner.is_some());
    }
}
