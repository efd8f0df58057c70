/// Rendering layer for human play. All terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state. No game logic is performed; this module only scales the
/// 800 × 600 playfield into the terminal and translates entities into
/// terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use crate::entities::{
    Bullet, BulletOwner, Enemy, EnemyKind, ExplosionKind, GameState, Phase, Rect,
    SCREEN_HEIGHT, SCREEN_WIDTH,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Green;
const C_HUD_LIVES: Color = Color::White;
const C_PLAYER: Color = Color::White;
const C_SQUID: Color = Color::Magenta;
const C_CRAB: Color = Color::Cyan;
const C_OCTOPUS: Color = Color::Green;
const C_MYSTERY: Color = Color::Red;
const C_BLOCKER: Color = Color::Green;
const C_BULLET_PLAYER: Color = Color::White;
const C_BULLET_ENEMY: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// Terminal cells available for the playfield, inside the border.
struct Viewport {
    cols: i32,
    rows: i32,
}

impl Viewport {
    fn new(width: u16, height: u16) -> Self {
        Self {
            cols: (width as i32 - 2).max(1),
            rows: (height as i32 - 4).max(1),
        }
    }

    /// Terminal cell for a playfield point, or `None` if it is off-screen.
    fn cell(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        if !(0..SCREEN_WIDTH).contains(&x) || !(0..SCREEN_HEIGHT).contains(&y) {
            return None;
        }
        let col = 1 + x * self.cols / SCREEN_WIDTH;
        let row = 2 + y * self.rows / SCREEN_HEIGHT;
        Some((col as u16, row as u16))
    }

    fn centre(&self, rect: Rect) -> Option<(u16, u16)> {
        self.cell(rect.x + rect.w / 2, rect.y + rect.h / 2)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let view = Viewport::new(width, height);

    draw_border(out, width, height)?;
    draw_hud(out, state, width)?;

    match state.phase {
        Phase::Playing => draw_playfield(out, state, &view)?,
        Phase::RoundClear => draw_banner(out, &NEXT_ROUND, width, height)?,
        Phase::GameOver => draw_banner(out, &GAME_OVER, width, height)?,
        Phase::TitleScreen if state.game_over => draw_banner(out, &GAME_OVER, width, height)?,
        Phase::TitleScreen => draw_banner(out, &TITLE, width, height)?,
    }

    draw_controls_hint(out, height)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Bottom bar
    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, width: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", state.score)))?;

    let lives_str = format!("Lives:{}", "▲".repeat(state.lives.remaining()));
    let rx = width.saturating_sub(lives_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_playfield<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_BLOCKER))?;
    for blocker in &state.blockers {
        draw_glyph(out, view, blocker.rect, "▒")?;
    }

    for enemy in state.formation.iter() {
        draw_enemy(out, view, enemy)?;
    }

    out.queue(style::SetForegroundColor(C_MYSTERY))?;
    draw_glyph(out, view, state.mystery.rect, "<◆>")?;

    for explosion in &state.explosions {
        let Some(rect) = explosion.visible_rect(state.clock) else {
            continue;
        };
        match explosion.kind {
            ExplosionKind::Enemy { .. } | ExplosionKind::Ship => {
                out.queue(style::SetForegroundColor(Color::Yellow))?;
                draw_glyph(out, view, rect, "*")?;
            }
            ExplosionKind::Mystery { points } => {
                out.queue(style::SetForegroundColor(Color::White))?;
                draw_glyph(out, view, rect, &points.to_string())?;
            }
        }
    }

    if state.player.alive {
        out.queue(style::SetForegroundColor(C_PLAYER))?;
        draw_glyph(out, view, state.player.rect, "/▲\\")?;
    }

    for bullet in state.player_bullets.iter().chain(&state.enemy_bullets) {
        draw_bullet(out, view, bullet)?;
    }

    Ok(())
}

/// Print `glyph` centred on `rect`.
fn draw_glyph<W: Write>(
    out: &mut W,
    view: &Viewport,
    rect: Rect,
    glyph: &str,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.centre(rect) {
        let half = glyph.chars().count() as u16 / 2;
        out.queue(cursor::MoveTo(col.saturating_sub(half).max(1), row))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, view: &Viewport, enemy: &Enemy) -> std::io::Result<()> {
    let (color, frames) = match enemy.kind() {
        EnemyKind::Squid => (C_SQUID, ["{@}", "/@\\"]),
        EnemyKind::Crab => (C_CRAB, ["«▼»", "»▼«"]),
        EnemyKind::Octopus => (C_OCTOPUS, ["(◎)", ")◎("]),
    };
    out.queue(style::SetForegroundColor(color))?;
    draw_glyph(out, view, enemy.rect, frames[enemy.frame as usize & 1])
}

fn draw_bullet<W: Write>(out: &mut W, view: &Viewport, bullet: &Bullet) -> std::io::Result<()> {
    let (color, glyph) = match bullet.owner {
        BulletOwner::Player => (C_BULLET_PLAYER, "║"),
        BulletOwner::Enemy => (C_BULLET_ENEMY, "↓"),
    };
    out.queue(style::SetForegroundColor(color))?;
    draw_glyph(out, view, bullet.rect, glyph)
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   R : New game   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

const TITLE: [(&str, Color); 6] = [
    ("SPACE  INVADERS", Color::White),
    ("{@}  =  30 pts", Color::Magenta),
    ("«▼»  =  20 pts", Color::Cyan),
    ("(◎)  =  10 pts", Color::Green),
    ("<◆>  =  ?????", Color::Red),
    ("Press any key to continue", Color::White),
];

const NEXT_ROUND: [(&str, Color); 1] = [("Next Round", Color::White)];

const GAME_OVER: [(&str, Color); 4] = [
    ("╔════════════════════╗", Color::Red),
    ("║    GAME  OVER      ║", Color::Red),
    ("╚════════════════════╝", Color::Red),
    ("R - Play Again  Q - Quit", Color::White),
];

fn draw_banner<W: Write>(
    out: &mut W,
    lines: &[(&str, Color)],
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}
