/// Round and game lifecycle.
///
/// ```text
/// TitleScreen ──start──▶ Playing ──formation + explosions gone──▶ RoundClear
///      ▲                    │                                      │ 3000 later
///      │                    │ game over                            ▼
///      └──── GameOver ◀─────┘                         Playing (next round, lower)
/// ```

use tracing::info;

use crate::entities::{make_blockers, Action, GameState, LifeChain, Mystery, Phase, Player};
use crate::formation::{EnemyFormation, ENEMY_MOVE_DOWN};

/// Top row of the formation at the start of a new game.
pub const ENEMY_DEFAULT_POSITION: i32 = 65;
pub const ROUND_CLEAR_DELAY: u64 = 3000;

/// Fresh round: full formation at `enemy_position`, barricades rebuilt,
/// all three lives restored, `score` carried over.
pub fn build_round(enemy_position: i32, score: u32, now: u64) -> GameState {
    GameState {
        player: Player::new(),
        player_bullets: Vec::new(),
        enemy_bullets: Vec::new(),
        formation: EnemyFormation::new(enemy_position, now),
        mystery: Mystery::spawn(now),
        blockers: make_blockers(),
        explosions: Vec::new(),
        lives: LifeChain::new(),
        score,
        prev_score: score,
        enemy_position,
        phase: Phase::Playing,
        game_over: false,
        respawn_pending: false,
        ship_timer: now,
        shoot_timer: now,
        round_timer: now,
        clock: now,
    }
}

/// State shown before the first `start`.
pub fn title_state(now: u64) -> GameState {
    GameState {
        phase: Phase::TitleScreen,
        ..build_round(ENEMY_DEFAULT_POSITION, 0, now)
    }
}

/// Pick the phase that follows a playing tick.
pub fn settle_playing(state: &mut GameState) {
    if state.game_over {
        state.phase = Phase::GameOver;
    } else if state.formation.is_empty() && state.explosions.is_empty() {
        info!(score = state.score, "round cleared");
        state.phase = Phase::RoundClear;
    }
}

/// One tick of the pause between rounds. The ship may still move but not
/// fire. Returns `true` on the tick the next round begins.
pub fn tick_round_clear(state: &mut GameState, action: Action) -> bool {
    let now = state.clock;
    if now.saturating_sub(state.round_timer) >= ROUND_CLEAR_DELAY {
        let position = state.enemy_position + ENEMY_MOVE_DOWN;
        *state = build_round(position, state.score, now);
        info!(enemy_position = position, score = state.score, "next round");
        return true;
    }
    if action != Action::Fire {
        state.player.apply_action(action);
    }
    false
}

/// The tick after game over: the next game starts from the top again.
pub fn settle_game_over(state: &mut GameState) {
    state.enemy_position = ENEMY_DEFAULT_POSITION;
    state.phase = Phase::TitleScreen;
}
