/// Per-tick game logic for the playing phase.
///
/// Every function mutates the `GameState` in place and reads the current
/// time from `state.clock`. Randomness only comes through the injected
/// `rng`, so callers control determinism (tests use a seeded RNG).

use rand::Rng;
use tracing::debug;

use crate::collision::{self, CollisionReport};
use crate::entities::{Action, Bullet, GameState, Player};
use crate::reward::{self, RewardSignal};

/// Score from which the player fires a mirrored pair instead of one shot.
pub const DOUBLE_SHOT_SCORE: u32 = 1000;
pub const SHIP_RESPAWN_DELAY: u64 = 900;
pub const ENEMY_SHOOT_INTERVAL: u64 = 700;

/// Result of one playing tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    pub collisions: CollisionReport,
    pub reward: f64,
}

// ── Player ────────────────────────────────────────────────────────────────────

/// Launch a volley if none is in flight and the ship is alive.
pub fn fire(state: &mut GameState) {
    if !state.player_bullets.is_empty() || !state.player.alive {
        return;
    }
    let ship = state.player.rect;
    if state.score < DOUBLE_SHOT_SCORE {
        state.player_bullets.push(Bullet::player(ship.x + 23, ship.y + 5));
    } else {
        state.player_bullets.push(Bullet::player(ship.x + 8, ship.y + 5));
        state.player_bullets.push(Bullet::player(ship.x + 38, ship.y + 5));
    }
}

/// Apply the agent's action and handle a pending fire request.
pub fn apply_action(state: &mut GameState, action: Action) {
    if !state.player.alive {
        return;
    }
    state.player.apply_action(action);
    if state.player.fired {
        state.player.fired = false;
        fire(state);
    }
}

pub fn respawn_ship(state: &mut GameState) {
    if state.respawn_pending && state.clock.saturating_sub(state.ship_timer) > SHIP_RESPAWN_DELAY {
        state.player = Player::new();
        state.respawn_pending = false;
        debug!("ship respawned");
    }
}

// ── Projectiles & effects ─────────────────────────────────────────────────────

/// Move every bullet one tick and drop the ones that left the playfield.
pub fn advance_projectiles(state: &mut GameState) {
    state.player_bullets.retain_mut(Bullet::advance);
    state.enemy_bullets.retain_mut(Bullet::advance);
}

pub fn expire_explosions(state: &mut GameState) {
    let now = state.clock;
    state.explosions.retain(|explosion| !explosion.is_expired(now));
}

/// Fire from the bottom of a random live column once the cadence allows.
pub fn enemies_shoot(state: &mut GameState, rng: &mut impl Rng) {
    let now = state.clock;
    if now.saturating_sub(state.shoot_timer) <= ENEMY_SHOOT_INTERVAL || state.formation.is_empty() {
        return;
    }
    if let Some(shooter) = state.formation.random_bottom(rng) {
        let bullet = Bullet::enemy(shooter.rect.x + 14, shooter.rect.y + 20);
        debug!(row = shooter.row, column = shooter.column, "enemy fired");
        state.enemy_bullets.push(bullet);
        state.shoot_timer = now;
    }
}

// ── Per-tick step ─────────────────────────────────────────────────────────────

/// Advance the playing phase by one tick and score it.
pub fn tick(state: &mut GameState, action: Action, rng: &mut impl Rng) -> TickOutcome {
    let now = state.clock;

    apply_action(state, action);

    // ── 1. Formation and mystery ship ────────────────────────────────────────
    state.formation.advance(now);
    state.mystery.advance(now);

    // ── 2. Bullets and explosions ────────────────────────────────────────────
    advance_projectiles(state);
    expire_explosions(state);

    // ── 3. Collisions ────────────────────────────────────────────────────────
    let collisions = collision::resolve(state, now, rng);

    // ── 4. Reward ────────────────────────────────────────────────────────────
    let signal = RewardSignal {
        score_delta: i64::from(state.score) - i64::from(state.prev_score),
        descents: state.formation.take_descents(),
        alive: state.formation.len(),
        game_over: collisions.game_over,
        life_lost: collisions.life_lost || state.respawn_pending,
        cleared: collisions.cleared,
    };
    state.prev_score = state.score;
    let reward = reward::reward_for(&signal);

    // ── 5. Respawn and return fire ───────────────────────────────────────────
    respawn_ship(state);
    enemies_shoot(state, rng);

    TickOutcome { collisions, reward }
}
