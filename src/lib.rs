//! Space Invaders as a step-driven environment.
//!
//! The game advances exactly one tick per [`SpaceInvaders::step`] call and
//! reports an observation image, a scalar reward and a terminal flag, so it can
//! be played by a human at the terminal or by an external agent.

pub mod collision;
pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod env;
pub mod error;
pub mod formation;
pub mod mystery;
pub mod observation;
pub mod reward;
pub mod round;
pub mod telemetry;

pub use config::EnvConfig;
pub use entities::Action;
pub use env::{SpaceInvaders, StepResult};
pub use error::{Error, Result};
pub use observation::Observation;
