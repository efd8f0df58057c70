/// Episode telemetry.
///
/// The environment appends one `score epsilon reward` line per finished game
/// to a plain-text log. A separate monitor process reads the whole file back
/// on an interval and summarises it; the helpers for that side live here too.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};

/// One finished episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeRecord {
    pub score: u32,
    /// The caller's exploration parameter when the episode ended.
    pub epsilon: f64,
    /// Cumulative reward over the episode.
    pub reward: f64,
}

/// Append-only episode log.
#[derive(Clone, Debug)]
pub struct TelemetryLog {
    path: PathBuf,
}

impl TelemetryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &EpisodeRecord) -> Result<()> {
        let io_err = |source| Error::Telemetry {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        writeln!(file, "{} {} {}", record.score, record.epsilon, record.reward).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        info!(
            score = record.score,
            epsilon = record.epsilon,
            reward = record.reward,
            "episode logged"
        );
        Ok(())
    }
}

// ── Reading ───────────────────────────────────────────────────────────────────

/// Parse a log's contents. Blank lines are skipped; any other line must hold
/// exactly three numbers.
pub fn parse_records(text: &str) -> Result<Vec<EpisodeRecord>> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let malformed = |reason: String| Error::MalformedRecord {
            line: index + 1,
            reason,
        };
        let &[score, epsilon, reward] = fields.as_slice() else {
            return Err(malformed(format!("expected 3 fields, found {}", fields.len())));
        };
        let score: f64 = score
            .parse()
            .map_err(|_| malformed(format!("score {score:?} is not a number")))?;
        let epsilon: f64 = epsilon
            .parse()
            .map_err(|_| malformed(format!("epsilon {epsilon:?} is not a number")))?;
        let reward: f64 = reward
            .parse()
            .map_err(|_| malformed(format!("reward {reward:?} is not a number")))?;
        if !score.is_finite() || score < 0.0 {
            return Err(malformed(format!("score {score} is out of range")));
        }
        records.push(EpisodeRecord {
            score: score as u32,
            epsilon,
            reward,
        });
    }
    Ok(records)
}

pub fn load_records(path: &Path) -> Result<Vec<EpisodeRecord>> {
    let text = fs::read_to_string(path).map_err(|source| Error::Telemetry {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&text)
}

// ── Statistics ────────────────────────────────────────────────────────────────

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Centred running mean, one output per input. Samples that fall outside
/// the series are replaced by the series mean.
pub fn running_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let fill = mean(values);
    let half = (window / 2) as isize;
    (0..values.len() as isize)
        .map(|i| {
            let total: f64 = (i - half..i - half + window as isize)
                .map(|j| {
                    usize::try_from(j)
                        .ok()
                        .and_then(|j| values.get(j))
                        .copied()
                        .unwrap_or(fill)
                })
                .sum();
            total / window as f64
        })
        .collect()
}

/// Sliding mean over full windows only.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    values.windows(window).map(mean).collect()
}

/// Mean of each complete, non-overlapping window; a short tail is dropped.
pub fn batch_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    values.chunks_exact(window).map(mean).collect()
}

/// Least-squares line through `(index, value)`. Returns `(slope, intercept)`.
pub fn linear_trend(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.len() < 2 {
        return (0.0, mean(values));
    }
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);
    let (mut num, mut den) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    let slope = num / den;
    (slope, y_mean - slope * x_mean)
}

/// What the monitor shows after each successful poll.
#[derive(Clone, Debug, PartialEq)]
pub struct MonitorSummary {
    pub episodes: usize,
    pub mean_score: f64,
    pub last: EpisodeRecord,
    /// Running mean of the reward column.
    pub smoothed: Vec<f64>,
    pub slope: f64,
    pub intercept: f64,
}

/// Summarise a log. `None` for an empty log.
pub fn summarize(records: &[EpisodeRecord], window: usize) -> Option<MonitorSummary> {
    let last = *records.last()?;
    let scores: Vec<f64> = records.iter().map(|r| f64::from(r.score)).collect();
    let rewards: Vec<f64> = records.iter().map(|r| r.reward).collect();
    let smoothed = running_mean(&rewards, window);
    let (slope, intercept) = linear_trend(&smoothed);
    Some(MonitorSummary {
        episodes: records.len(),
        mean_score: mean(&scores),
        last,
        smoothed,
        slope,
        intercept,
    })
}
