/// Observation frames for the controlling agent.
///
/// The game is drawn onto a full-size RGB canvas as flat-coloured
/// rectangles, then area-averaged down to the requested resolution and
/// handed out channel-first in BGR order with values in `[0, 1]`.

use crate::entities::{
    BulletSprite, ExplosionKind, GameState, Phase, Rect, SCREEN_HEIGHT, SCREEN_WIDTH,
};

pub type Rgb = [u8; 3];

// ── Colour palette ────────────────────────────────────────────────────────────

pub const BLACK: Rgb = [0, 0, 0];
pub const WHITE: Rgb = [255, 255, 255];
pub const GREEN: Rgb = [78, 255, 87];
pub const YELLOW: Rgb = [241, 255, 0];
pub const BLUE: Rgb = [80, 255, 239];
pub const PURPLE: Rgb = [203, 0, 255];
pub const RED: Rgb = [237, 28, 36];

/// Colour of enemies (and their explosions) by formation row.
pub fn row_color(row: usize) -> Rgb {
    match row {
        0 => PURPLE,
        1 | 2 => BLUE,
        _ => GREEN,
    }
}

// ── Canvas ────────────────────────────────────────────────────────────────────

/// Full-resolution frame buffer, row-major RGB.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BLACK; width * height],
        }
    }

    /// Canvas the size of the playfield.
    pub fn playfield() -> Self {
        Self::new(SCREEN_WIDTH as usize, SCREEN_HEIGHT as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.pixels.fill(BLACK);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Fill `rect`, clipped to the canvas.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let x0 = rect.x.clamp(0, self.width as i32) as usize;
        let x1 = rect.right().clamp(0, self.width as i32) as usize;
        let y0 = rect.y.clamp(0, self.height as i32) as usize;
        let y1 = rect.bottom().clamp(0, self.height as i32) as usize;
        for y in y0..y1 {
            let row = y * self.width;
            self.pixels[row + x0..row + x1].fill(color);
        }
    }
}

/// Draw the frame for the current phase.
pub fn render(canvas: &mut Canvas, state: &GameState) {
    canvas.clear();
    match state.phase {
        Phase::TitleScreen | Phase::GameOver => {}
        Phase::RoundClear => draw_lives(canvas, state),
        Phase::Playing => {
            for blocker in &state.blockers {
                canvas.fill_rect(blocker.rect, GREEN);
            }
            draw_lives(canvas, state);
            canvas.fill_rect(state.mystery.rect, RED);
            for enemy in state.formation.iter() {
                canvas.fill_rect(enemy.rect, row_color(enemy.row));
            }
            if state.player.alive {
                canvas.fill_rect(state.player.rect, WHITE);
            }
            for bullet in state.player_bullets.iter().chain(&state.enemy_bullets) {
                let color = match bullet.sprite {
                    BulletSprite::Laser => WHITE,
                    BulletSprite::EnemyLaser => YELLOW,
                };
                canvas.fill_rect(bullet.rect, color);
            }
            for explosion in &state.explosions {
                let Some(rect) = explosion.visible_rect(state.clock) else {
                    continue;
                };
                let color = match explosion.kind {
                    ExplosionKind::Enemy { row } => row_color(row),
                    ExplosionKind::Mystery { .. } | ExplosionKind::Ship => WHITE,
                };
                canvas.fill_rect(rect, color);
            }
        }
    }
}

fn draw_lives(canvas: &mut Canvas, state: &GameState) {
    for life in state.lives.markers.iter().filter(|life| life.alive) {
        canvas.fill_rect(life.rect, WHITE);
    }
}

// ── Observation ───────────────────────────────────────────────────────────────

/// A `[3][height][width]` image, channels in BGR order, values in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl Observation {
    pub const CHANNELS: usize = 3;

    /// Downsample `canvas` to `width × height` by averaging the source pixels
    /// under each output pixel.
    pub fn from_canvas(canvas: &Canvas, width: usize, height: usize) -> Self {
        let plane = width * height;
        let mut data = vec![0.0; Self::CHANNELS * plane];
        for oy in 0..height {
            let (y0, y1) = source_span(oy, height, canvas.height());
            for ox in 0..width {
                let (x0, x1) = source_span(ox, width, canvas.width());
                let mut sum = [0u32; 3];
                for y in y0..y1 {
                    for x in x0..x1 {
                        let px = canvas.pixel(x, y);
                        for (acc, value) in sum.iter_mut().zip(px) {
                            *acc += u32::from(value);
                        }
                    }
                }
                let count = ((y1 - y0) * (x1 - x0)) as f32 * 255.0;
                let [r, g, b] = sum;
                let at = oy * width + ox;
                data[at] = b as f32 / count;
                data[plane + at] = g as f32 / count;
                data[2 * plane + at] = r as f32 / count;
            }
        }
        Self { width, height, data }
    }

    /// Value of `channel` (0 = blue, 1 = green, 2 = red) at `(x, y)`.
    pub fn get(&self, channel: usize, x: usize, y: usize) -> f32 {
        self.data[channel * self.width * self.height + y * self.width + x]
    }
}

/// Source range covered by output index `i` when mapping `out` samples onto
/// `src`; never empty.
fn source_span(i: usize, out: usize, src: usize) -> (usize, usize) {
    let start = i * src / out;
    let end = ((i + 1) * src / out).max(start + 1).min(src);
    (start.min(src - 1), end)
}
