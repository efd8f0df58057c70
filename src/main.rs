use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use invaders_env::display;
use invaders_env::entities::{GameState, Phase};
use invaders_env::{Action, EnvConfig, SpaceInvaders};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

#[derive(Parser, Debug)]
#[command(name = "invaders_env")]
#[command(about = "Space Invaders as a step-driven environment, for humans or agents")]
struct Cli {
    /// Seed for the game's RNG (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Game clock advance per step
    #[arg(long, default_value_t = 30)]
    tick_ms: u64,
    #[arg(long, default_value_t = 84)]
    obs_width: usize,
    #[arg(long, default_value_t = 84)]
    obs_height: usize,
    /// Append one `score epsilon reward` line per finished game here
    #[arg(long)]
    telemetry: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play in the terminal
    Play {
        /// Write logs here instead of discarding them
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Run a headless epsilon-greedy bot
    Agent {
        #[arg(long, default_value_t = 10)]
        episodes: u32,
        /// Probability of a random action instead of the scripted one
        #[arg(long, default_value_t = 0.1)]
        epsilon: f64,
        /// Give up on an episode after this many steps
        #[arg(long, default_value_t = 200_000)]
        max_steps: u64,
    },
}

impl Cli {
    fn env_config(&self) -> EnvConfig {
        EnvConfig {
            obs_width: self.obs_width,
            obs_height: self.obs_height,
            tick_ms: self.tick_ms,
            seed: self.seed,
            telemetry_path: self.telemetry.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let env = SpaceInvaders::new(cli.env_config()).context("invalid environment settings")?;

    match &cli.command {
        Commands::Play { log_file } => {
            if let Some(path) = log_file {
                let file = File::create(path)
                    .with_context(|| format!("cannot create log file {}", path.display()))?;
                tracing_subscriber::fmt()
                    .with_env_filter(EnvFilter::from_default_env())
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
            play(env)
        }
        Commands::Agent {
            episodes,
            epsilon,
            max_steps,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
            run_agent(env, *episodes, *epsilon, *max_steps, cli.seed)
        }
    }
}

// ── Headless agent ────────────────────────────────────────────────────────────

/// Chase the lowest enemy and shoot when underneath it.
fn scripted_action(state: &GameState) -> Action {
    let ship = state.player.rect;
    let ship_centre = ship.x + ship.w / 2;
    let target = state
        .formation
        .iter()
        .max_by_key(|enemy| (enemy.rect.bottom(), -(enemy.rect.x - ship_centre).abs()))
        .map(|enemy| enemy.rect.x + enemy.rect.w / 2);

    match target {
        Some(x) if x < ship_centre - 15 => Action::MoveLeft,
        Some(x) if x > ship_centre + 15 => Action::MoveRight,
        Some(_) => Action::Fire,
        None => Action::Noop,
    }
}

fn run_agent(
    mut env: SpaceInvaders,
    episodes: u32,
    epsilon: f64,
    max_steps: u64,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ 0x5eed),
        None => StdRng::from_entropy(),
    };
    env.set_exploration(epsilon);

    for episode in 1..=episodes {
        env.start();
        let mut steps = 0u64;
        loop {
            let action = if rng.gen_bool(epsilon.clamp(0.0, 1.0)) {
                Action::ALL[rng.gen_range(0..Action::ALL.len())]
            } else {
                scripted_action(env.state())
            };
            steps += 1;
            if env.step(action).terminal || steps >= max_steps {
                break;
            }
        }
        info!(
            episode,
            steps,
            score = env.score(),
            reward = env.episode_reward(),
            "episode finished"
        );
        println!(
            "episode {episode:>4}  steps {steps:>7}  score {:>6}  reward {:>10.1}",
            env.score(),
            env.episode_reward()
        );
    }
    Ok(())
}

// ── Human play ────────────────────────────────────────────────────────────────

/// Min frames between shots while Space is held.
const SHOOT_COOLDOWN: u32 = 8;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn play(env: SpaceInvaders) -> Result<()> {
    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for key-release events; terminals without support fall back to
    // the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread to blocking event reads so the game loop never
    // blocks on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = game_loop(&mut out, env, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

/// Runs until the player quits.
///
/// Input model: `key_frame` records the frame of the last press/repeat of
/// every key. Each frame the freshest keys are folded into a single action
/// for that step: firing wins when the shoot cooldown allows it, otherwise
/// the held direction moves the ship.
fn game_loop<W: Write>(
    out: &mut W,
    mut env: SpaceInvaders,
    rx: &mpsc::Receiver<Event>,
) -> Result<()> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut shoot_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut terminal_seen = false;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent {
            code,
            kind,
            modifiers,
            ..
        })) = rx.try_recv()
        {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code.clone(), frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') if terminal_seen => {
                            env.start();
                            terminal_seen = false;
                        }
                        _ if env.phase() == Phase::TitleScreen && !terminal_seen => env.start(),
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code.clone(), frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Fold held keys into this step's action ────────────────────────────
        let left = is_held(&key_frame, &KeyCode::Left, frame)
            || is_held(&key_frame, &KeyCode::Char('a'), frame)
            || is_held(&key_frame, &KeyCode::Char('A'), frame);
        let right = is_held(&key_frame, &KeyCode::Right, frame)
            || is_held(&key_frame, &KeyCode::Char('d'), frame)
            || is_held(&key_frame, &KeyCode::Char('D'), frame);
        let shoot = is_held(&key_frame, &KeyCode::Char(' '), frame);

        let action = if shoot && shoot_cooldown == 0 {
            shoot_cooldown = SHOOT_COOLDOWN;
            Action::Fire
        } else if left {
            Action::MoveLeft
        } else if right {
            Action::MoveRight
        } else {
            Action::Noop
        };
        shoot_cooldown = shoot_cooldown.saturating_sub(1);

        if env.step(action).terminal {
            terminal_seen = true;
        }

        let (width, height) = terminal::size()?;
        display::render(out, env.state(), width, height)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}
