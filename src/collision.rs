/// Collision resolution between entity groups.
///
/// `resolve` runs the pairings in a fixed order every playing tick. Later
/// pairings only see what survived the earlier ones, so a bullet that took
/// out an enemy cannot also chip a blocker.

use rand::Rng;
use tracing::{debug, info};

use crate::entities::{Bullet, Enemy, Explosion, GameState, Hitbox, Mystery, Rect};
use crate::mystery::roll_points;

/// Formation bottom at which enemies start crushing the player.
pub const PLAYER_CONTACT_LINE: i32 = 540;
/// Formation bottom at which the invasion has landed.
pub const FLOOR: i32 = 600;
/// Formation bottom at which enemies start eating the barricades.
pub const BLOCKER_CONTACT_LINE: i32 = crate::entities::BLOCKERS_POSITION;

/// What the collision pass did this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Enemies and mystery ships shot down.
    pub kills: u32,
    /// A life marker was spent and a respawn scheduled.
    pub life_lost: bool,
    pub game_over: bool,
    /// This tick's shots emptied a formation that was populated before.
    pub cleared: bool,
}

/// Collide every member of `a` against `b`, in `a`'s order.
///
/// A member of `a` that touches anything in `b` is returned (and removed
/// when `kill_a`); everything in `b` it touches is removed when `kill_b`, so
/// later members of `a` can no longer hit it.
pub fn group_collide<A, B>(a: &mut Vec<A>, b: &mut Vec<B>, kill_a: bool, kill_b: bool) -> Vec<A>
where
    A: Hitbox + Clone,
    B: Hitbox,
{
    let mut hits = Vec::new();
    let mut i = 0;
    while i < a.len() {
        let rect = a[i].rect();
        let collided = if kill_b {
            let before = b.len();
            b.retain(|other| !rect.intersects(&other.rect()));
            b.len() < before
        } else {
            b.iter().any(|other| rect.intersects(&other.rect()))
        };

        if collided && kill_a {
            hits.push(a.remove(i));
            continue;
        }
        if collided {
            hits.push(a[i].clone());
        }
        i += 1;
    }
    hits
}

/// Remove every bullet touching `target`. Returns whether any did.
fn strike(target: Rect, bullets: &mut Vec<Bullet>) -> bool {
    let before = bullets.len();
    bullets.retain(|bullet| !target.intersects(&bullet.rect));
    bullets.len() < before
}

fn formation_members(state: &GameState) -> Vec<Enemy> {
    state.formation.iter().copied().collect()
}

pub fn resolve(state: &mut GameState, now: u64, rng: &mut impl Rng) -> CollisionReport {
    let mut report = CollisionReport::default();
    let populated = !state.formation.is_empty();

    // 1. Shots cancel each other out.
    group_collide(&mut state.player_bullets, &mut state.enemy_bullets, true, true);

    // 2. Player shots against the formation.
    let mut enemies = formation_members(state);
    for hit in group_collide(&mut enemies, &mut state.player_bullets, false, true) {
        if let Some(enemy) = state.formation.kill(hit.row, hit.column) {
            state.score += enemy.points();
            state.explosions.push(Explosion::enemy(&enemy, now));
            state.round_timer = now;
            report.kills += 1;
        }
    }
    report.cleared = populated && state.formation.is_empty();

    // 3. Player shots against the mystery ship.
    if strike(state.mystery.rect, &mut state.player_bullets) {
        let points = roll_points(rng);
        state.score += points;
        state.explosions.push(Explosion::mystery(&state.mystery, points, now));
        state.mystery = Mystery::spawn(now);
        report.kills += 1;
        debug!(points, "mystery ship destroyed");
    }

    // 4. Enemy shots against the player.
    if state.player.alive && strike(state.player.rect, &mut state.enemy_bullets) {
        state.player.alive = false;
        if state.lives.consume() {
            state.explosions.push(Explosion::ship(&state.player, now));
            state.respawn_pending = true;
            state.ship_timer = now;
            report.life_lost = true;
            info!(lives = state.lives.remaining(), "ship destroyed");
        } else {
            state.game_over = true;
            info!(score = state.score, "ship destroyed with no lives left");
        }
    }

    // 5. The formation has reached the player's row.
    if state.formation.bottom() >= PLAYER_CONTACT_LINE {
        if state.player.alive {
            let mut player = vec![state.player.clone()];
            let mut enemies = formation_members(state);
            let crushed = group_collide(&mut enemies, &mut player, false, true);
            for enemy in &crushed {
                state.formation.kill(enemy.row, enemy.column);
            }
            if !crushed.is_empty() {
                state.player.alive = false;
            }
        }
        if !state.player.alive || state.formation.bottom() >= FLOOR {
            state.game_over = true;
            info!(bottom = state.formation.bottom(), "formation reached the floor");
        }
    }

    // 6–7. Any shot chips the barricades.
    group_collide(&mut state.enemy_bullets, &mut state.blockers, true, true);
    group_collide(&mut state.player_bullets, &mut state.blockers, true, true);

    // 8. A low enough formation grinds through them.
    if state.formation.bottom() >= BLOCKER_CONTACT_LINE {
        let mut enemies = formation_members(state);
        group_collide(&mut enemies, &mut state.blockers, false, true);
    }

    report.game_over = state.game_over;
    report
}
