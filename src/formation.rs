/// Enemy formation controller.
///
/// The formation is a fixed 5 × 10 arena of optional enemies indexed by
/// `(row, column)`. A slot is emptied when its enemy dies and is never
/// reused, so grid coordinates stay stable for the whole round. Alongside the
/// grid the controller keeps the set of columns that still hold an enemy and
/// the current left/right flank columns; when a flank column is wiped out the
/// flank walks inward and the formation is allowed 5 more steps of travel per
/// column consumed.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::debug;

use crate::entities::Enemy;

pub const ROWS: usize = 5;
pub const COLUMNS: usize = 10;

pub const BASE_MOVE_TIME: u64 = 600;
pub const FEW_LEFT_MOVE_TIME: u64 = 400;
pub const LAST_ONE_MOVE_TIME: u64 = 200;
const FEW_LEFT: usize = 10;

/// Steps of horizontal travel per sweep before reversing.
pub const BASE_MOVES: u32 = 30;
/// Extra steps granted per destroyed flank column.
pub const FLANK_BONUS: u32 = 5;
/// The formation spawns centred, so the first sweep is half-length.
const INITIAL_MOVE_NUMBER: u32 = 15;

pub const ENEMY_STEP_X: i32 = 10;
pub const ENEMY_MOVE_DOWN: i32 = 35;
const ENEMY_ORIGIN_X: i32 = 157;
const ENEMY_SPACING_X: i32 = 50;
const ENEMY_SPACING_Y: i32 = 45;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    fn reversed(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn sign(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnemyFormation {
    grid: [[Option<Enemy>; COLUMNS]; ROWS],
    direction: Direction,
    left_moves: u32,
    right_moves: u32,
    left_add_move: u32,
    right_add_move: u32,
    move_number: u32,
    move_time: u64,
    timer: u64,
    /// Descents since the reward engine last drained the counter.
    descents: u32,
    bottom: i32,
    alive_columns: BTreeSet<usize>,
    left_alive_column: usize,
    right_alive_column: usize,
    alive: usize,
}

impl EnemyFormation {
    /// Full formation with its top row at `enemy_position`, clocked from `now`.
    pub fn new(enemy_position: i32, now: u64) -> Self {
        let grid = std::array::from_fn(|row| {
            std::array::from_fn(|column| {
                Some(Enemy::new(
                    row,
                    column,
                    ENEMY_ORIGIN_X + column as i32 * ENEMY_SPACING_X,
                    enemy_position + row as i32 * ENEMY_SPACING_Y,
                ))
            })
        });
        let mut formation = Self {
            grid,
            direction: Direction::Right,
            left_moves: BASE_MOVES,
            right_moves: BASE_MOVES,
            left_add_move: 0,
            right_add_move: 0,
            move_number: INITIAL_MOVE_NUMBER,
            move_time: BASE_MOVE_TIME,
            timer: now,
            descents: 0,
            bottom: 0,
            alive_columns: (0..COLUMNS).collect(),
            left_alive_column: 0,
            right_alive_column: COLUMNS - 1,
            alive: ROWS * COLUMNS,
        };
        formation.recompute_bottom();
        formation
    }

    /// Step the formation if more than `move_time` has passed since the last
    /// step. Returns `true` when a step happened.
    pub fn advance(&mut self, now: u64) -> bool {
        if now.saturating_sub(self.timer) <= self.move_time {
            return false;
        }

        if self.move_number >= self.move_allowance() {
            self.descents += 1;
            self.left_moves = BASE_MOVES + self.right_add_move;
            self.right_moves = BASE_MOVES + self.left_add_move;
            self.direction = self.direction.reversed();
            self.move_number = 0;
            for enemy in self.grid.iter_mut().flatten().flatten() {
                enemy.rect.y += ENEMY_MOVE_DOWN;
                enemy.toggle_frame();
            }
            self.recompute_bottom();
            debug!(bottom = self.bottom, direction = ?self.direction, "formation descended");
        } else {
            let velocity = ENEMY_STEP_X * self.direction.sign();
            for enemy in self.grid.iter_mut().flatten().flatten() {
                enemy.rect.x += velocity;
                enemy.toggle_frame();
            }
            self.move_number += 1;
        }
        self.timer += self.move_time;
        true
    }

    /// Steps allowed in the current direction before the next descent.
    pub fn move_allowance(&self) -> u32 {
        match self.direction {
            Direction::Right => self.right_moves + self.right_add_move,
            Direction::Left => self.left_moves + self.left_add_move,
        }
    }

    /// Remove the enemy at `(row, column)` and update the flank bookkeeping.
    pub fn kill(&mut self, row: usize, column: usize) -> Option<Enemy> {
        let enemy = self.grid.get_mut(row)?.get_mut(column)?.take()?;
        self.alive -= 1;

        let mut column_dead = self.is_column_dead(column);
        if column_dead {
            self.alive_columns.remove(&column);
        }

        if column == self.right_alive_column {
            while self.right_alive_column > 0 && column_dead {
                self.right_alive_column -= 1;
                self.right_add_move += FLANK_BONUS;
                column_dead = self.is_column_dead(self.right_alive_column);
            }
        } else if column == self.left_alive_column {
            while self.left_alive_column + 1 < COLUMNS && column_dead {
                self.left_alive_column += 1;
                self.left_add_move += FLANK_BONUS;
                column_dead = self.is_column_dead(self.left_alive_column);
            }
        }

        self.update_speed();
        self.recompute_bottom();
        debug!(row, column, alive = self.alive, "enemy removed from formation");
        Some(enemy)
    }

    pub fn is_column_dead(&self, column: usize) -> bool {
        self.grid.iter().all(|row| row[column].is_none())
    }

    /// Lowest surviving enemy of a uniformly chosen live column, or `None`
    /// when the formation is empty.
    pub fn random_bottom(&self, rng: &mut impl Rng) -> Option<&Enemy> {
        if self.alive_columns.is_empty() {
            return None;
        }
        let pick = rng.gen_range(0..self.alive_columns.len());
        let column = *self.alive_columns.iter().nth(pick)?;
        self.grid.iter().rev().find_map(|row| row[column].as_ref())
    }

    fn update_speed(&mut self) {
        if self.alive == 1 {
            self.move_time = LAST_ONE_MOVE_TIME;
        } else if self.alive <= FEW_LEFT {
            self.move_time = FEW_LEFT_MOVE_TIME;
        }
    }

    fn recompute_bottom(&mut self) {
        self.bottom = self
            .grid
            .iter()
            .flatten()
            .flatten()
            .map(|enemy| enemy.rect.bottom())
            .max()
            .unwrap_or(0);
    }

    /// Return and clear the descent count accumulated since the last call.
    pub fn take_descents(&mut self) -> u32 {
        std::mem::take(&mut self.descents)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&Enemy> {
        self.grid.get(row)?.get(column)?.as_ref()
    }

    /// Live enemies in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.grid.iter().flatten().flatten()
    }

    pub fn len(&self) -> usize {
        self.alive
    }

    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn move_time(&self) -> u64 {
        self.move_time
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    pub fn alive_columns(&self) -> &BTreeSet<usize> {
        &self.alive_columns
    }

    pub fn left_alive_column(&self) -> usize {
        self.left_alive_column
    }

    pub fn right_alive_column(&self) -> usize {
        self.right_alive_column
    }

    pub fn left_add_move(&self) -> u32 {
        self.left_add_move
    }

    pub fn right_add_move(&self) -> u32 {
        self.right_add_move
    }
}
