use invaders_env::compute::*;
use invaders_env::entities::*;
use invaders_env::formation::ROWS;
use invaders_env::round::build_round;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_state() -> GameState {
    build_round(65, 0, 0)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// ── fire ──────────────────────────────────────────────────────────────────────

#[test]
fn fire_launches_one_bullet_from_the_ship() {
    let mut state = make_state();
    fire(&mut state);
    assert_eq!(state.player_bullets.len(), 1);
    let b = &state.player_bullets[0];
    assert_eq!((b.rect.x, b.rect.y), (398, 545));
    assert_eq!(b.owner, BulletOwner::Player);
}

#[test]
fn fire_is_ignored_while_a_shot_is_in_flight() {
    let mut state = make_state();
    fire(&mut state);
    state.player.rect.x = 100;
    fire(&mut state);
    assert_eq!(state.player_bullets.len(), 1);
    assert_eq!(state.player_bullets[0].rect.x, 398);
}

#[test]
fn high_score_fires_a_pair() {
    let mut state = make_state();
    state.score = 1000;
    fire(&mut state);
    let xs: Vec<i32> = state.player_bullets.iter().map(|b| b.rect.x).collect();
    assert_eq!(xs, vec![383, 413]);
}

#[test]
fn dead_ship_cannot_fire() {
    let mut state = make_state();
    state.player.alive = false;
    fire(&mut state);
    assert!(state.player_bullets.is_empty());
}

// ── apply_action ──────────────────────────────────────────────────────────────

#[test]
fn fire_action_consumes_the_flag() {
    let mut state = make_state();
    apply_action(&mut state, Action::Fire);
    assert_eq!(state.player_bullets.len(), 1);
    assert!(!state.player.fired);
}

#[test]
fn actions_are_ignored_while_dead() {
    let mut state = make_state();
    state.player.alive = false;
    apply_action(&mut state, Action::MoveLeft);
    apply_action(&mut state, Action::Fire);
    assert_eq!(state.player.rect.x, 375);
    assert!(state.player_bullets.is_empty());
}

// ── respawn ───────────────────────────────────────────────────────────────────

#[test]
fn ship_respawns_after_delay() {
    let mut state = make_state();
    state.player.alive = false;
    state.player.rect.x = 100;
    state.respawn_pending = true;
    state.ship_timer = 0;

    state.clock = 900;
    respawn_ship(&mut state);
    assert!(!state.player.alive);

    state.clock = 901;
    respawn_ship(&mut state);
    assert!(state.player.alive);
    assert!(!state.respawn_pending);
    assert_eq!(state.player.rect.x, 375);
}

// ── projectiles & explosions ──────────────────────────────────────────────────

#[test]
fn projectiles_move_and_leave() {
    let mut state = make_state();
    state.player_bullets.push(Bullet::player(100, 20));
    state.enemy_bullets.push(Bullet::enemy(100, 300));
    advance_projectiles(&mut state);
    assert!(state.player_bullets.is_empty());
    assert_eq!(state.enemy_bullets[0].rect.y, 305);
}

#[test]
fn explosions_are_dropped_when_expired() {
    let mut state = make_state();
    let enemy = *state.formation.get(0, 0).unwrap();
    state.explosions.push(Explosion::enemy(&enemy, 0));

    state.clock = 400;
    expire_explosions(&mut state);
    assert_eq!(state.explosions.len(), 1);

    state.clock = 401;
    expire_explosions(&mut state);
    assert!(state.explosions.is_empty());
}

// ── enemies_shoot ─────────────────────────────────────────────────────────────

#[test]
fn enemies_hold_fire_until_the_interval_passes() {
    let mut state = make_state();
    let mut rng = seeded_rng();
    state.clock = 700;
    enemies_shoot(&mut state, &mut rng);
    assert!(state.enemy_bullets.is_empty());

    state.clock = 701;
    enemies_shoot(&mut state, &mut rng);
    assert_eq!(state.enemy_bullets.len(), 1);
    assert_eq!(state.shoot_timer, 701);
}

#[test]
fn enemy_shot_leaves_from_the_bottom_row() {
    let mut state = make_state();
    state.clock = 701;
    enemies_shoot(&mut state, &mut seeded_rng());
    let b = &state.enemy_bullets[0];
    assert_eq!(b.rect.y, 245 + 20);
    assert_eq!((b.rect.x - 157 - 14) % 50, 0);
    assert_eq!(b.owner, BulletOwner::Enemy);
}

#[test]
fn empty_formation_does_not_shoot() {
    let mut state = make_state();
    for row in 0..ROWS {
        for column in 0..10 {
            state.formation.kill(row, column);
        }
    }
    state.clock = 5000;
    enemies_shoot(&mut state, &mut seeded_rng());
    assert!(state.enemy_bullets.is_empty());
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn quiet_tick_earns_the_base_reward() {
    let mut state = make_state();
    let outcome = tick(&mut state, Action::Noop, &mut seeded_rng());
    assert!((outcome.reward - 0.1).abs() < 1e-9);
    assert_eq!(outcome.collisions.kills, 0);
}

#[test]
fn fired_bullet_moves_on_its_first_tick() {
    let mut state = make_state();
    tick(&mut state, Action::Fire, &mut seeded_rng());
    let b = &state.player_bullets[0];
    assert_eq!((b.rect.x, b.rect.y), (398, 525));
}

#[test]
fn kill_reward_is_ten_per_point() {
    let mut state = make_state();
    // Lands on enemy (4, 0) after moving 20 up
    state.player_bullets.push(Bullet::player(160, 270));
    let outcome = tick(&mut state, Action::Noop, &mut seeded_rng());
    assert_eq!(state.score, 10);
    assert_eq!(state.prev_score, 10);
    assert!((outcome.reward - 100.1).abs() < 1e-9);
}

#[test]
fn top_row_kill_reward() {
    let mut state = make_state();
    for row in 1..ROWS {
        state.formation.kill(row, 0);
    }
    state.player_bullets.push(Bullet::player(160, 90));
    let outcome = tick(&mut state, Action::Noop, &mut seeded_rng());
    assert_eq!(state.score, 30);
    assert!((outcome.reward - 300.1).abs() < 1e-9);
}

#[test]
fn descent_is_penalised_per_living_enemy() {
    let mut state = make_state();
    for k in 1..=15 {
        state.formation.advance(600 * k + 1);
    }
    state.formation.take_descents();
    state.clock = 600 * 16 + 1;

    let outcome = tick(&mut state, Action::Noop, &mut seeded_rng());
    assert!((outcome.reward - (0.1 - 0.1 * 50.0)).abs() < 1e-9);
    assert_eq!(state.formation.take_descents(), 0);
}

#[test]
fn lost_life_replaces_the_reward() {
    let mut state = make_state();
    state.enemy_bullets.push(Bullet::enemy(380, 540));
    let outcome = tick(&mut state, Action::Noop, &mut seeded_rng());
    assert!(outcome.collisions.life_lost);
    assert_eq!(outcome.reward, -300.0);
}

#[test]
fn waiting_to_respawn_keeps_the_penalty() {
    let mut state = make_state();
    state.player.alive = false;
    state.respawn_pending = true;
    state.ship_timer = 0;

    state.clock = 500;
    let outcome = tick(&mut state, Action::Noop, &mut seeded_rng());
    assert!(!outcome.collisions.life_lost);
    assert_eq!(outcome.reward, -300.0);

    // The tick the ship comes back is still charged
    state.clock = 901;
    let outcome = tick(&mut state, Action::Noop, &mut seeded_rng());
    assert!(state.player.alive);
    assert_eq!(outcome.reward, -300.0);
}
