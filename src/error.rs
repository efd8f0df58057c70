/// Error taxonomy for the environment library.
///
/// Game over is not an error: it is reported through the terminal flag of a
/// step. The variants here cover bad configuration, raw actions outside the
/// enumerated set, and the telemetry log.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("action {0} is outside 0..=3")]
    InvalidAction(i64),

    #[error("telemetry log {path}: {source}")]
    Telemetry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("telemetry row {line} is malformed: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
