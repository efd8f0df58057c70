use invaders_env::reward::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn idle_tick() {
    assert!(close(reward_for(&RewardSignal::default()), 0.1));
}

#[test]
fn score_is_weighted_by_ten() {
    let signal = RewardSignal {
        score_delta: 30,
        alive: 49,
        ..RewardSignal::default()
    };
    assert!(close(reward_for(&signal), 300.1));
}

#[test]
fn descents_cost_per_living_enemy() {
    let signal = RewardSignal {
        score_delta: 30,
        descents: 1,
        alive: 49,
        ..RewardSignal::default()
    };
    assert!(close(reward_for(&signal), 300.1 - 4.9));

    let twice = RewardSignal {
        descents: 2,
        alive: 10,
        ..RewardSignal::default()
    };
    assert!(close(reward_for(&twice), 0.1 - 2.0));
}

#[test]
fn game_over_overrides_everything() {
    let signal = RewardSignal {
        score_delta: 300,
        descents: 1,
        alive: 20,
        game_over: true,
        life_lost: true,
        cleared: true,
    };
    assert_eq!(reward_for(&signal), -1000.0);
}

#[test]
fn life_lost_overrides_shaping() {
    let signal = RewardSignal {
        score_delta: 20,
        life_lost: true,
        alive: 30,
        ..RewardSignal::default()
    };
    assert_eq!(reward_for(&signal), -300.0);
}

#[test]
fn clearing_the_formation_adds_the_win_bonus() {
    let signal = RewardSignal {
        score_delta: 10,
        alive: 0,
        cleared: true,
        ..RewardSignal::default()
    };
    assert!(close(reward_for(&signal), 0.1 + 100.0 + 1000.0));
}

#[test]
fn life_lost_beats_clear() {
    let signal = RewardSignal {
        score_delta: 10,
        life_lost: true,
        cleared: true,
        ..RewardSignal::default()
    };
    assert_eq!(reward_for(&signal), -300.0);
}
