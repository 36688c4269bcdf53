use log::info;

use crate::geometry::BodyTag;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GameState {
    #[default]
    Playing,
    Won,
}

/// Side effect requested from the world/UI when the game is won.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    RevealBanner,
    SetGravityY(f64),
    ReleaseWalls,
}

/// Win-condition machine. `Playing` moves to `Won` the first time the ball
/// touches the goal; nothing leaves `Won`.
#[derive(Clone, Debug)]
pub struct WinTracker {
    state: GameState,
    collapse_gravity: f64,
}

impl WinTracker {
    pub fn new(collapse_gravity: f64) -> Self {
        Self {
            state: GameState::Playing,
            collapse_gravity,
        }
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Feeds one collision pair. Returns the effects to apply, empty unless
    /// this pair caused the transition.
    pub fn on_collision(&mut self, a: BodyTag, b: BodyTag) -> Vec<Effect> {
        let ball_meets_goal = matches!(
            (a, b),
            (BodyTag::Ball, BodyTag::Goal) | (BodyTag::Goal, BodyTag::Ball)
        );
        if !ball_meets_goal || self.state == GameState::Won {
            return Vec::new();
        }

        self.state = GameState::Won;
        info!("ball reached the goal, collapsing the maze");
        vec![
            Effect::RevealBanner,
            Effect::SetGravityY(self.collapse_gravity),
            Effect::ReleaseWalls,
        ]
    }

    /// Label-based variant; unknown labels are ignored.
    pub fn on_labels(&mut self, a: &str, b: &str) -> Vec<Effect> {
        match (BodyTag::from_label(a), BodyTag::from_label(b)) {
            (Some(a), Some(b)) => self.on_collision(a, b),
            _ => Vec::new(),
        }
    }
}
