/// Mystery target controller: a bonus ship that waits out its own timer,
/// then glides across the top of the screen and bounces back at either side.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::entities::{Mystery, Rect};

pub const MYSTERY_MOVE_TIME: u64 = 25_000;
pub const MYSTERY_SPEED: i32 = 2;
pub const MYSTERY_POINTS: [u32; 4] = [50, 100, 150, 300];

const SPAWN_X: i32 = -80;
const SPAWN_Y: i32 = 45;
const WIDTH: i32 = 75;
const HEIGHT: i32 = 35;

impl Mystery {
    pub fn spawn(now: u64) -> Self {
        Self {
            rect: Rect::new(SPAWN_X, SPAWN_Y, WIDTH, HEIGHT),
            direction: 1,
            move_time: MYSTERY_MOVE_TIME,
            timer: now,
            missed: 0,
        }
    }

    /// Move one tick once the wait has elapsed; bounce and restart the wait
    /// after leaving either side of the screen.
    pub fn advance(&mut self, now: u64) {
        let passed = now.saturating_sub(self.timer);
        let moving = passed > self.move_time;
        if moving {
            if self.direction == 1 && self.rect.x < 840 {
                self.rect.x += MYSTERY_SPEED;
            }
            if self.direction == -1 && self.rect.x > -100 {
                self.rect.x -= MYSTERY_SPEED;
            }
        }

        let mut bounced = false;
        if self.rect.x > 830 {
            self.direction = -1;
            bounced = true;
        }
        if self.rect.x < -90 {
            self.direction = 1;
            bounced = true;
        }
        if moving && bounced {
            self.timer = now;
            self.missed += 1;
        }
    }
}

/// Points for shooting down a mystery ship.
pub fn roll_points(rng: &mut impl Rng) -> u32 {
    MYSTERY_POINTS.choose(rng).copied().unwrap_or(MYSTERY_POINTS[0])
}
