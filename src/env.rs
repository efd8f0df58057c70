//! Step interface.
//!
//! `SpaceInvaders` owns the game state, the single seeded RNG every random
//! draw goes through, and the canvas observations are rendered on. Each
//! `step` applies one action, advances exactly one tick, and returns the
//! observation, reward and terminal flag for that tick. Callers serialise
//! their calls; nothing runs between steps.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::compute;
use crate::config::EnvConfig;
use crate::entities::{Action, GameState, Phase};
use crate::error::Result;
use crate::observation::{self, Canvas, Observation};
use crate::round::{self, ENEMY_DEFAULT_POSITION};
use crate::telemetry::{EpisodeRecord, TelemetryLog};

/// Everything one tick reports back to the caller.
#[derive(Clone, Debug)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub terminal: bool,
}

pub struct SpaceInvaders {
    config: EnvConfig,
    state: GameState,
    rng: ChaCha8Rng,
    canvas: Canvas,
    telemetry: Option<TelemetryLog>,
    /// Caller's exploration parameter, copied into telemetry.
    exploration: f64,
    episode_reward: f64,
    episode_logged: bool,
}

impl SpaceInvaders {
    /// Validate `config` and build an environment sitting on the title screen.
    pub fn new(config: EnvConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let telemetry = config.telemetry_path.clone().map(TelemetryLog::new);
        Ok(Self {
            config,
            state: round::title_state(0),
            rng,
            canvas: Canvas::playfield(),
            telemetry,
            exploration: 0.0,
            episode_reward: 0.0,
            episode_logged: false,
        })
    }

    /// Begin a new game: default formation height, score zero, three lives.
    pub fn start(&mut self) {
        self.state.enemy_position = ENEMY_DEFAULT_POSITION;
        self.reset(0);
        self.episode_reward = 0.0;
        info!("game started");
    }

    /// Rebuild the round at the current formation height, carrying
    /// `carry_over_score` forward. After a game over this begins a new
    /// episode: its reward starts from zero and it will be logged.
    pub fn reset(&mut self, carry_over_score: u32) {
        if self.state.game_over {
            self.episode_reward = 0.0;
        }
        self.episode_logged = false;
        let state = &self.state;
        self.state = round::build_round(state.enemy_position, carry_over_score, state.clock);
    }

    /// Advance one tick.
    pub fn step(&mut self, action: Action) -> StepResult {
        let reward = match self.state.phase {
            Phase::TitleScreen => 0.0,
            Phase::Playing => {
                let outcome = compute::tick(&mut self.state, action, &mut self.rng);
                round::settle_playing(&mut self.state);
                outcome.reward
            }
            Phase::RoundClear => {
                round::tick_round_clear(&mut self.state, action);
                0.0
            }
            Phase::GameOver => {
                round::settle_game_over(&mut self.state);
                0.0
            }
        };
        self.episode_reward += reward;
        if self.state.game_over && !self.episode_logged {
            self.finish_episode();
        }

        let observation = self.observe();
        self.state.clock += self.config.tick_ms;
        StepResult {
            observation,
            reward,
            terminal: self.state.game_over,
        }
    }

    /// `step` for raw agent outputs; anything outside 0..=3 is a no-op.
    pub fn step_raw(&mut self, raw: i64) -> StepResult {
        self.step(Action::from_raw(raw))
    }

    /// Render the current state without advancing it.
    pub fn observe(&mut self) -> Observation {
        observation::render(&mut self.canvas, &self.state);
        Observation::from_canvas(&self.canvas, self.config.obs_width, self.config.obs_height)
    }

    fn finish_episode(&mut self) {
        self.episode_logged = true;
        info!(
            score = self.state.score,
            reward = self.episode_reward,
            "game over"
        );
        let Some(log) = &self.telemetry else {
            return;
        };
        let record = EpisodeRecord {
            score: self.state.score,
            epsilon: self.exploration,
            reward: self.episode_reward,
        };
        if let Err(err) = log.append(&record) {
            warn!(%err, "could not write episode telemetry");
        }
    }

    pub fn set_exploration(&mut self, epsilon: f64) {
        self.exploration = epsilon;
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for scripted scenarios and tests.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn episode_reward(&self) -> f64 {
        self.episode_reward
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }
}
