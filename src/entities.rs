/// All game entity types, plus the small per-entity behaviour each one owns
/// (moving a bullet, toggling an animation frame, expiring an explosion).
/// Group-level behaviour lives in the controller modules.

use tracing::warn;

use crate::error::Error;
use crate::formation::EnemyFormation;

// ── Playfield ─────────────────────────────────────────────────────────────────

pub const SCREEN_WIDTH: i32 = 800;
pub const SCREEN_HEIGHT: i32 = 600;

pub const PLAYER_START_X: i32 = 375;
pub const PLAYER_START_Y: i32 = 540;
pub const PLAYER_WIDTH: i32 = 50;
pub const PLAYER_HEIGHT: i32 = 48;
pub const MOVE_SPEED: i32 = 20;
const PLAYER_MIN_X: i32 = 10;
const PLAYER_MAX_X: i32 = 740;

pub const BULLET_SPEED: i32 = 20;
pub const ENEMY_BULLET_SPEED: i32 = 5;
pub const BULLET_WIDTH: i32 = 5;
pub const BULLET_HEIGHT: i32 = 15;
/// Bullets die once they move above this row...
pub const BULLET_MIN_Y: i32 = 15;
/// ...or below this one.
pub const BULLET_MAX_Y: i32 = 600;

pub const ENEMY_WIDTH: i32 = 40;
pub const ENEMY_HEIGHT: i32 = 35;

pub const BLOCKERS_POSITION: i32 = 450;
pub const BLOCKER_SIZE: i32 = 10;
pub const BLOCKER_ROWS: usize = 4;
pub const BLOCKER_COLUMNS: usize = 9;
pub const BARRICADES: usize = 4;

pub const LIFE_SIZE: i32 = 23;
const LIFE_POSITIONS: [(i32, i32); 3] = [(715, 3), (742, 3), (769, 3)];

pub const ENEMY_EXPLOSION_LIFETIME: u64 = 400;
pub const MYSTERY_EXPLOSION_LIFETIME: u64 = 600;
pub const SHIP_EXPLOSION_LIFETIME: u64 = 900;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in playfield pixels, top-left anchored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Strict overlap test; rectangles that only share an edge do not collide.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Anything the collision resolver can test against another group.
pub trait Hitbox {
    fn rect(&self) -> Rect;
}

// ── Actions ───────────────────────────────────────────────────────────────────

/// The four controls available to the player or agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Noop,
    Fire,
    MoveLeft,
    MoveRight,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Noop,
        Action::Fire,
        Action::MoveLeft,
        Action::MoveRight,
    ];

    /// Map a raw agent output onto an action, falling back to `Noop` for
    /// anything outside the enumerated set.
    pub fn from_raw(raw: i64) -> Action {
        Action::try_from(raw).unwrap_or_else(|err| {
            warn!(%err, "falling back to no-op");
            Action::Noop
        })
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<i64> for Action {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Action::Noop),
            1 => Ok(Action::Fire),
            2 => Ok(Action::MoveLeft),
            3 => Ok(Action::MoveRight),
            other => Err(Error::InvalidAction(other)),
        }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub speed: i32,
    pub alive: bool,
    /// Set by a `Fire` action, consumed by the next fire attempt.
    pub fired: bool,
}

impl Player {
    pub fn new() -> Self {
        Self {
            rect: Rect::new(PLAYER_START_X, PLAYER_START_Y, PLAYER_WIDTH, PLAYER_HEIGHT),
            speed: MOVE_SPEED,
            alive: true,
            fired: false,
        }
    }

    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::Noop => {}
            Action::Fire => self.fired = true,
            Action::MoveLeft if self.rect.x > PLAYER_MIN_X => self.rect.x -= self.speed,
            Action::MoveRight if self.rect.x < PLAYER_MAX_X => self.rect.x += self.speed,
            Action::MoveLeft | Action::MoveRight => {}
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Hitbox for Player {
    fn rect(&self) -> Rect {
        self.rect
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// Which sprite a bullet is drawn with. Rendering only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletSprite {
    Laser,
    EnemyLaser,
}

#[derive(Clone, Debug)]
pub struct Bullet {
    pub rect: Rect,
    /// −1 travels up, +1 travels down.
    pub direction: i32,
    pub speed: i32,
    pub owner: BulletOwner,
    pub sprite: BulletSprite,
}

impl Bullet {
    pub fn player(x: i32, y: i32) -> Self {
        Self {
            rect: Rect::new(x, y, BULLET_WIDTH, BULLET_HEIGHT),
            direction: -1,
            speed: BULLET_SPEED,
            owner: BulletOwner::Player,
            sprite: BulletSprite::Laser,
        }
    }

    pub fn enemy(x: i32, y: i32) -> Self {
        Self {
            rect: Rect::new(x, y, BULLET_WIDTH, BULLET_HEIGHT),
            direction: 1,
            speed: ENEMY_BULLET_SPEED,
            owner: BulletOwner::Enemy,
            sprite: BulletSprite::EnemyLaser,
        }
    }

    /// Move one tick. Returns `false` once the bullet has left the
    /// vertical playfield and should be dropped.
    pub fn advance(&mut self) -> bool {
        self.rect.y += self.speed * self.direction;
        (BULLET_MIN_Y..=BULLET_MAX_Y).contains(&self.rect.y)
    }
}

impl Hitbox for Bullet {
    fn rect(&self) -> Rect {
        self.rect
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Squid,
    Crab,
    Octopus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Enemy {
    pub row: usize,
    pub column: usize,
    pub rect: Rect,
    /// Animation frame, 0 or 1.
    pub frame: u8,
}

impl Enemy {
    pub fn new(row: usize, column: usize, x: i32, y: i32) -> Self {
        Self {
            row,
            column,
            rect: Rect::new(x, y, ENEMY_WIDTH, ENEMY_HEIGHT),
            frame: 0,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self.row {
            0 => EnemyKind::Squid,
            1 | 2 => EnemyKind::Crab,
            _ => EnemyKind::Octopus,
        }
    }

    /// Score awarded for destroying this enemy.
    pub fn points(&self) -> u32 {
        match self.row {
            0 => 30,
            1 | 2 => 20,
            _ => 10,
        }
    }

    pub fn toggle_frame(&mut self) {
        self.frame ^= 1;
    }
}

impl Hitbox for Enemy {
    fn rect(&self) -> Rect {
        self.rect
    }
}

// ── Mystery target ────────────────────────────────────────────────────────────

/// Bonus ship crossing the top of the screen. Movement lives in `mystery.rs`.
#[derive(Clone, Debug)]
pub struct Mystery {
    pub rect: Rect,
    pub direction: i32,
    pub move_time: u64,
    pub timer: u64,
    /// Completed crossings that nobody shot down.
    pub missed: u32,
}

impl Hitbox for Mystery {
    fn rect(&self) -> Rect {
        self.rect
    }
}

// ── Blockers ──────────────────────────────────────────────────────────────────

/// One destructible cell of a barricade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blocker {
    pub rect: Rect,
    pub barricade: usize,
    pub row: usize,
    pub column: usize,
}

impl Hitbox for Blocker {
    fn rect(&self) -> Rect {
        self.rect
    }
}

/// Build the 4 × 9 cell grid of barricade `number`.
pub fn make_barricade(number: usize) -> Vec<Blocker> {
    let mut cells = Vec::with_capacity(BLOCKER_ROWS * BLOCKER_COLUMNS);
    for row in 0..BLOCKER_ROWS {
        for column in 0..BLOCKER_COLUMNS {
            cells.push(Blocker {
                rect: Rect::new(
                    50 + 200 * number as i32 + column as i32 * BLOCKER_SIZE,
                    BLOCKERS_POSITION + row as i32 * BLOCKER_SIZE,
                    BLOCKER_SIZE,
                    BLOCKER_SIZE,
                ),
                barricade: number,
                row,
                column,
            });
        }
    }
    cells
}

pub fn make_blockers() -> Vec<Blocker> {
    (0..BARRICADES).flat_map(make_barricade).collect()
}

// ── Lives ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Life {
    pub rect: Rect,
    pub alive: bool,
}

/// The three life markers, consumed back to front.
#[derive(Clone, Debug)]
pub struct LifeChain {
    pub markers: [Life; 3],
}

impl LifeChain {
    pub fn new() -> Self {
        Self {
            markers: LIFE_POSITIONS.map(|(x, y)| Life {
                rect: Rect::new(x, y, LIFE_SIZE, LIFE_SIZE),
                alive: true,
            }),
        }
    }

    /// Knock out the rightmost remaining marker. Returns `false` when none
    /// were left, i.e. the hit that ends the game.
    pub fn consume(&mut self) -> bool {
        match self.markers.iter_mut().rev().find(|life| life.alive) {
            Some(life) => {
                life.alive = false;
                true
            }
            None => false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.markers.iter().filter(|life| life.alive).count()
    }
}

impl Default for LifeChain {
    fn default() -> Self {
        Self::new()
    }
}

// ── Explosions ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExplosionKind {
    /// Enemy burst, coloured by the row it came from.
    Enemy { row: usize },
    /// Floating score popup where the mystery ship was hit.
    Mystery { points: u32 },
    Ship,
}

#[derive(Clone, Debug)]
pub struct Explosion {
    pub kind: ExplosionKind,
    pub rect: Rect,
    pub created_at: u64,
}

impl Explosion {
    pub fn enemy(enemy: &Enemy, now: u64) -> Self {
        Self {
            kind: ExplosionKind::Enemy { row: enemy.row },
            rect: enemy.rect,
            created_at: now,
        }
    }

    pub fn mystery(mystery: &Mystery, points: u32, now: u64) -> Self {
        Self {
            kind: ExplosionKind::Mystery { points },
            rect: Rect::new(mystery.rect.x + 20, mystery.rect.y + 6, 40, 20),
            created_at: now,
        }
    }

    pub fn ship(player: &Player, now: u64) -> Self {
        Self {
            kind: ExplosionKind::Ship,
            rect: player.rect,
            created_at: now,
        }
    }

    pub fn lifetime(&self) -> u64 {
        match self.kind {
            ExplosionKind::Enemy { .. } => ENEMY_EXPLOSION_LIFETIME,
            ExplosionKind::Mystery { .. } => MYSTERY_EXPLOSION_LIFETIME,
            ExplosionKind::Ship => SHIP_EXPLOSION_LIFETIME,
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.created_at) > self.lifetime()
    }

    /// Area to draw at `now`, or `None` during the blink-off phases.
    pub fn visible_rect(&self, now: u64) -> Option<Rect> {
        let passed = now.saturating_sub(self.created_at);
        match self.kind {
            ExplosionKind::Enemy { .. } if passed <= 100 => Some(self.rect),
            ExplosionKind::Enemy { .. } if passed <= 200 => {
                Some(Rect::new(self.rect.x - 6, self.rect.y - 6, 50, 45))
            }
            ExplosionKind::Mystery { .. } if passed <= 200 || (401..=600).contains(&passed) => {
                Some(self.rect)
            }
            ExplosionKind::Ship if (301..=600).contains(&passed) => Some(self.rect),
            _ => None,
        }
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Lifecycle of a game as seen by the step interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    TitleScreen,
    Playing,
    RoundClear,
    GameOver,
}

/// The entire mutable game state. Every timer-driven field is measured
/// against `clock`.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub player_bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub formation: EnemyFormation,
    pub mystery: Mystery,
    pub blockers: Vec<Blocker>,
    pub explosions: Vec<Explosion>,
    pub lives: LifeChain,
    pub score: u32,
    /// Score at the end of the previous playing tick.
    pub prev_score: u32,
    /// Top row of the formation for the current round.
    pub enemy_position: i32,
    pub phase: Phase,
    pub game_over: bool,
    /// Ship destroyed and waiting for `ship_timer` to elapse.
    pub respawn_pending: bool,
    pub ship_timer: u64,
    /// Last enemy shot.
    pub shoot_timer: u64,
    /// Last enemy kill; the round-clear pause runs from here.
    pub round_timer: u64,
    pub clock: u64,
}
