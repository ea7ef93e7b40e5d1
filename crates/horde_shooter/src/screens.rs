//! Play and game-over screen flow
//!
//! Only the state machine lives here; drawing the HUD belongs to whatever
//! consumes the frame.

use std::fmt::Write;

use crate::config::ScreensConfig;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScreenState {
    /// Player alive, HUD shows the score
    Play,
    /// Player dead; taps restart once the pause has passed
    GameOver {
        /// Seconds on this screen
        elapsed: f32,
    },
}

/// Screen state machine
#[derive(Debug, Clone)]
pub struct Screens {
    state: ScreenState,
    pause: f32,
}

impl Screens {
    /// Start on the play screen
    pub fn new(config: &ScreensConfig) -> Self {
        Self {
            state: ScreenState::Play,
            pause: config.game_over_pause,
        }
    }

    /// Current screen
    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// Advance one frame
    ///
    /// `restarted` reports a restart applied this frame and returns to play.
    /// Returns true when a tap on the game-over screen asks for a restart.
    pub fn update(&mut self, player_dead: bool, restarted: bool, delta: f32, tapped: bool) -> bool {
        if restarted {
            self.state = ScreenState::Play;
            return false;
        }

        match self.state {
            ScreenState::Play => {
                if player_dead {
                    log::info!("Game over");
                    self.state = ScreenState::GameOver { elapsed: 0.0 };
                }
                false
            }
            ScreenState::GameOver { ref mut elapsed } => {
                *elapsed += delta;
                *elapsed >= self.pause && tapped
            }
        }
    }
}

/// HUD score text, reusing one buffer
#[derive(Debug, Clone)]
pub struct ScoreLabel {
    text: String,
}

impl ScoreLabel {
    const PREFIX: &'static str = "SCORE ";

    /// Label reading `SCORE 0`
    pub fn new() -> Self {
        let mut label = Self {
            text: String::with_capacity(Self::PREFIX.len() + 10),
        };
        label.update(0);
        label
    }

    /// Rewrite the number
    pub fn update(&mut self, score: u32) {
        self.text.clear();
        self.text.push_str(Self::PREFIX);
        // Writing into a String cannot fail.
        let _ = write!(self.text, "{score}");
    }

    /// Current text
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for ScoreLabel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screens() -> Screens {
        Screens::new(&ScreensConfig::default())
    }

    #[test]
    fn test_death_switches_to_game_over() {
        let mut screens = screens();
        assert!(!screens.update(false, false, 0.1, true));
        assert_eq!(screens.state(), ScreenState::Play);

        screens.update(true, false, 0.1, false);
        assert_eq!(screens.state(), ScreenState::GameOver { elapsed: 0.0 });
    }

    #[test]
    fn test_taps_ignored_during_pause() {
        let mut screens = screens();
        screens.update(true, false, 0.0, false);

        assert!(!screens.update(true, false, 2.0, true));
        assert!(!screens.update(true, false, 0.5, true));
        assert!(screens.update(true, false, 0.5, true));
    }

    #[test]
    fn test_restart_returns_to_play() {
        let mut screens = screens();
        screens.update(true, false, 0.0, false);
        screens.update(false, true, 0.1, false);
        assert_eq!(screens.state(), ScreenState::Play);
    }

    #[test]
    fn test_score_label() {
        let mut label = ScoreLabel::new();
        assert_eq!(label.as_str(), "SCORE 0");
        label.update(1234);
        assert_eq!(label.as_str(), "SCORE 1234");
        label.update(7);
        assert_eq!(label.as_str(), "SCORE 7");
    }
}
