use crate::environments::car_game::Action;
use crate::error::{GameError, Result};
use crate::policy::Policy;

/// Scripted baseline: switch lanes once the oncoming car in our lane gets close.
///
/// Reads the raw (unnormalized) observation `[player_lane, enemy_lane, enemy_y_norm]`.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicPolicy {
    pub react_at: f32,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self { react_at: 0.3 }
    }
}

impl HeuristicPolicy {
    pub fn new(react_at: f32) -> Self {
        Self { react_at }
    }
}

impl Policy<[f32], Action> for HeuristicPolicy {
    fn select_action(&self, state: &[f32]) -> Result<Action> {
        let &[player_lane, enemy_lane, enemy_y] = state else {
            return Err(GameError::DimensionMismatch {
                expected: 3,
                actual: state.len(),
            });
        };

        if player_lane != enemy_lane || enemy_y < self.react_at {
            return Ok(Action::Stay);
        }
        // 同一车道且敌车已接近: 换到另一条车道
        if player_lane == 0.0 {
            Ok(Action::Right)
        } else {
            Ok(Action::Left)
        }
    }
}
