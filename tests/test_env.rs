use invaders_env::entities::{Bullet, Phase};
use invaders_env::formation::{COLUMNS, ROWS};
use invaders_env::telemetry::load_records;
use invaders_env::{Action, EnvConfig, Error, Observation, SpaceInvaders};

fn seeded_config(seed: u64) -> EnvConfig {
    EnvConfig {
        seed: Some(seed),
        ..EnvConfig::default()
    }
}

fn playing_env() -> SpaceInvaders {
    let mut env = SpaceInvaders::new(seeded_config(42)).unwrap();
    env.start();
    env
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── construction ──────────────────────────────────────────────────────────────

#[test]
fn rejects_bad_configuration() {
    let configs = [
        EnvConfig {
            obs_width: 0,
            ..EnvConfig::default()
        },
        EnvConfig {
            obs_height: 601,
            ..EnvConfig::default()
        },
        EnvConfig {
            tick_ms: 0,
            ..EnvConfig::default()
        },
    ];
    for config in configs {
        assert!(matches!(
            SpaceInvaders::new(config),
            Err(Error::InvalidConfig(_))
        ));
    }
}

#[test]
fn starts_on_the_title_screen() {
    let mut env = SpaceInvaders::new(seeded_config(1)).unwrap();
    assert_eq!(env.phase(), Phase::TitleScreen);

    let result = env.step(Action::Fire);
    assert_eq!(result.reward, 0.0);
    assert!(!result.terminal);
    assert_eq!(env.phase(), Phase::TitleScreen);
    assert!(result.observation.data.iter().all(|&v| v == 0.0));
}

// ── observations ──────────────────────────────────────────────────────────────

#[test]
fn observation_has_the_configured_shape() {
    let mut env = SpaceInvaders::new(EnvConfig {
        obs_width: 100,
        obs_height: 50,
        seed: Some(3),
        ..EnvConfig::default()
    })
    .unwrap();
    env.start();
    let obs = env.step(Action::Noop).observation;
    assert_eq!((obs.width, obs.height), (100, 50));
    assert_eq!(obs.data.len(), Observation::CHANNELS * 100 * 50);
    assert!(obs.data.iter().all(|v| (0.0..=1.0).contains(v)));
    assert!(obs.data.iter().any(|&v| v > 0.0));
}

// ── time ──────────────────────────────────────────────────────────────────────

#[test]
fn each_step_advances_the_clock_by_one_tick() {
    let mut env = SpaceInvaders::new(EnvConfig {
        tick_ms: 16,
        seed: Some(5),
        ..EnvConfig::default()
    })
    .unwrap();
    env.start();
    for _ in 0..3 {
        env.step(Action::Noop);
    }
    assert_eq!(env.state().clock, 48);
}

#[test]
fn first_playing_step_earns_the_base_reward() {
    let mut env = playing_env();
    let result = env.step(Action::Noop);
    assert!(close(result.reward, 0.1));
    assert!(!result.terminal);
}

// ── determinism ───────────────────────────────────────────────────────────────

#[test]
fn same_seed_same_actions_same_episode() {
    let mut a = SpaceInvaders::new(seeded_config(7)).unwrap();
    let mut b = SpaceInvaders::new(seeded_config(7)).unwrap();
    a.start();
    b.start();
    for i in 0..1500 {
        let action = Action::ALL[(i / 7) % 4];
        let ra = a.step(action);
        let rb = b.step(action);
        assert_eq!(ra.reward, rb.reward, "step {i}");
        assert_eq!(ra.terminal, rb.terminal, "step {i}");
        assert_eq!(ra.observation, rb.observation, "step {i}");
    }
    assert_eq!(a.score(), b.score());
}

#[test]
fn unknown_raw_action_is_a_no_op() {
    let mut a = SpaceInvaders::new(seeded_config(9)).unwrap();
    let mut b = SpaceInvaders::new(seeded_config(9)).unwrap();
    a.start();
    b.start();
    for _ in 0..100 {
        let ra = a.step_raw(9);
        let rb = b.step(Action::Noop);
        assert_eq!(ra.observation, rb.observation);
    }
    assert_eq!(a.state().player.rect, b.state().player.rect);
}

// ── lives ─────────────────────────────────────────────────────────────────────

#[test]
fn hit_costs_a_life_and_the_ship_respawns() {
    let mut env = playing_env();
    env.state_mut().enemy_bullets.push(Bullet::enemy(380, 540));
    let result = env.step(Action::Noop);
    assert_eq!(result.reward, -300.0);
    assert!(!result.terminal);
    assert_eq!(env.state().lives.remaining(), 2);

    // Every tick of the wait is penalised, including the one the ship
    // returns on
    let mut steps = 0;
    while !env.state().player.alive {
        let result = env.step(Action::Noop);
        assert_eq!(result.reward, -300.0, "waiting tick {steps}");
        steps += 1;
        assert!(steps < 100);
    }
    // Hit at clock 0, back once more than 900 has passed: clock 930
    assert_eq!(steps, 31);

    let result = env.step(Action::Noop);
    assert!(close(result.reward, 0.1));
}

#[test]
fn last_hit_ends_the_episode() {
    let mut env = playing_env();
    for marker in env.state_mut().lives.markers.iter_mut() {
        marker.alive = false;
    }
    env.state_mut().enemy_bullets.push(Bullet::enemy(380, 540));

    let result = env.step(Action::Noop);
    assert_eq!(result.reward, -1000.0);
    assert!(result.terminal);
    assert_eq!(env.phase(), Phase::GameOver);

    let result = env.step(Action::Noop);
    assert_eq!(result.reward, 0.0);
    assert!(result.terminal);
    assert_eq!(env.phase(), Phase::TitleScreen);

    env.start();
    let result = env.step(Action::Noop);
    assert!(!result.terminal);
    assert_eq!(env.score(), 0);
    assert_eq!(env.state().lives.remaining(), 3);
}

// ── rounds ────────────────────────────────────────────────────────────────────

#[test]
fn clearing_a_round_pays_out_and_the_next_starts_lower() {
    let mut env = playing_env();
    for row in 0..ROWS {
        for column in 0..COLUMNS {
            if (row, column) != (4, 0) {
                env.state_mut().formation.kill(row, column);
            }
        }
    }
    env.state_mut().player_bullets.push(Bullet::player(160, 270));

    let result = env.step(Action::Noop);
    assert!(close(result.reward, 0.1 + 100.0 + 1000.0));
    assert_eq!(env.score(), 10);
    // The explosion is still on screen
    assert_eq!(env.phase(), Phase::Playing);

    let mut saw_round_clear = false;
    let mut next_round_clock = None;
    for _ in 0..200 {
        let clock = env.state().clock;
        let phase = env.phase();
        let result = env.step(Action::Noop);
        if phase == Phase::RoundClear {
            saw_round_clear = true;
            assert_eq!(result.reward, 0.0);
        }
        if env.phase() == Phase::Playing && phase == Phase::RoundClear {
            next_round_clock = Some(clock);
            break;
        }
    }
    assert!(saw_round_clear);
    assert_eq!(next_round_clock, Some(3000));

    let state = env.state();
    assert_eq!(state.enemy_position, 100);
    assert_eq!(state.score, 10);
    assert_eq!(state.formation.len(), 50);
    assert_eq!(state.formation.get(0, 0).unwrap().rect.y, 100);
    assert_eq!(state.lives.remaining(), 3);
}

// ── telemetry ─────────────────────────────────────────────────────────────────

#[test]
fn finished_games_are_logged_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.txt");
    let mut env = SpaceInvaders::new(EnvConfig {
        seed: Some(11),
        telemetry_path: Some(path.clone()),
        ..EnvConfig::default()
    })
    .unwrap();
    env.set_exploration(0.25);

    for _ in 0..2 {
        env.start();
        for marker in env.state_mut().lives.markers.iter_mut() {
            marker.alive = false;
        }
        env.state_mut().enemy_bullets.push(Bullet::enemy(380, 540));
        for _ in 0..3 {
            env.step(Action::Noop);
        }
    }

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 2);
    for record in records {
        assert_eq!(record.score, 0);
        assert_eq!(record.epsilon, 0.25);
        assert_eq!(record.reward, -1000.0);
    }
}

#[test]
fn reset_after_game_over_starts_a_logged_episode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.txt");
    let mut env = SpaceInvaders::new(EnvConfig {
        seed: Some(13),
        telemetry_path: Some(path.clone()),
        ..EnvConfig::default()
    })
    .unwrap();
    env.start();

    for _ in 0..2 {
        for marker in env.state_mut().lives.markers.iter_mut() {
            marker.alive = false;
        }
        env.state_mut().enemy_bullets.push(Bullet::enemy(380, 540));
        assert!(env.step(Action::Noop).terminal);
        env.reset(0);
        assert_eq!(env.episode_reward(), 0.0);
    }

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].reward, -1000.0);
}
