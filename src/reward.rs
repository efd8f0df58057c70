/// Reward shaping for the controlling agent.
///
/// A playing tick is worth a small survival bonus plus ten times the points
/// scored, minus a penalty for every formation descent scaled by how many
/// enemies are still alive. Losing a life or the game replaces all of that
/// with a flat penalty; clearing the formation adds a flat bonus.

pub const BASE_REWARD: f64 = 0.1;
pub const BASE_SCORE_REWARD: f64 = 10.0;
pub const BASE_DOWN_PENALTY: f64 = -0.1;
pub const PENALTY_GAME_OVER: f64 = -1000.0;
pub const PENALTY_LOSE_LIFE: f64 = -300.0;
pub const WIN_REWARD: f64 = 1000.0;

/// Everything the reward depends on, gathered after the collision pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardSignal {
    pub score_delta: i64,
    /// Full descents since the previous tick.
    pub descents: u32,
    /// Enemies alive after this tick's collisions.
    pub alive: usize,
    pub game_over: bool,
    /// Ship destroyed this tick or still waiting to respawn.
    pub life_lost: bool,
    /// The last enemy died this tick.
    pub cleared: bool,
}

impl RewardSignal {
    fn shaped(&self) -> f64 {
        BASE_REWARD
            + BASE_SCORE_REWARD * self.score_delta as f64
            + BASE_DOWN_PENALTY * self.descents as f64 * self.alive as f64
    }
}

pub fn reward_for(signal: &RewardSignal) -> f64 {
    if signal.game_over {
        PENALTY_GAME_OVER
    } else if signal.life_lost {
        PENALTY_LOSE_LIFE
    } else if signal.cleared {
        signal.shaped() + WIN_REWARD
    } else {
        signal.shaped()
    }
}
