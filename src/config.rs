use std::path::PathBuf;

use crate::entities::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::{Error, Result};

/// Configuration for one environment instance.
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// Observation width in pixels.
    pub obs_width: usize,
    /// Observation height in pixels.
    pub obs_height: usize,
    /// Clock advance per step, in the time units every game timer uses.
    pub tick_ms: u64,
    /// RNG seed. Same seed and same actions = same episode.
    pub seed: Option<u64>,
    /// Append one record per finished episode here, if set.
    pub telemetry_path: Option<PathBuf>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            obs_width: 84,
            obs_height: 84,
            tick_ms: 30,
            seed: None,
            telemetry_path: None,
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> Result<()> {
        if self.obs_width == 0 || self.obs_height == 0 {
            return Err(Error::InvalidConfig("observation size must be non-zero"));
        }
        if self.obs_width > SCREEN_WIDTH as usize || self.obs_height > SCREEN_HEIGHT as usize {
            return Err(Error::InvalidConfig(
                "observation size must not exceed the 800x600 playfield",
            ));
        }
        if self.tick_ms == 0 {
            return Err(Error::InvalidConfig("tick_ms must be non-zero"));
        }
        Ok(())
    }
}
