//! Live view of the episode telemetry log.
//!
//! Polls the log on an interval, smooths the reward column with a running
//! mean, fits a straight line through it and redraws a small bar chart.
//! Unreadable, partial or empty logs skip the cycle; the next poll retries.
//!
//! Usage:
//!   invaders_monitor --log stats.txt --window 20

use std::io::{stdout, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use invaders_env::telemetry::{load_records, summarize, MonitorSummary};

#[derive(Parser, Debug)]
#[command(name = "invaders_monitor")]
#[command(about = "Plot the running mean and trend of logged episode rewards")]
struct Args {
    /// Telemetry log written by `invaders_env --telemetry`
    #[arg(long)]
    log: PathBuf,
    /// Running-mean window, in episodes
    #[arg(long, default_value_t = 1)]
    window: usize,
    #[arg(long, default_value_t = 2)]
    interval_secs: u64,
    /// Chart width in episodes (most recent shown)
    #[arg(long, default_value_t = 60)]
    columns: usize,
}

const CHART_ROWS: usize = 12;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut out = stdout();

    loop {
        thread::sleep(Duration::from_secs(args.interval_secs));

        let records = match load_records(&args.log) {
            Ok(records) => records,
            Err(err) => {
                debug!(%err, "skipping refresh");
                continue;
            }
        };
        let Some(summary) = summarize(&records, args.window) else {
            debug!("log is empty");
            continue;
        };
        draw(&mut out, &summary, &args)?;
    }
}

fn draw<W: Write>(out: &mut W, summary: &MonitorSummary, args: &Args) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(format!(
        "Average reward (running mean {} episodes, epsilon {})\r\n",
        args.window, summary.last.epsilon
    )))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print(format!(
        "episodes {}  mean score {:.1}  last score {}  last reward {:.1}  trend {:+.3}/episode\r\n\r\n",
        summary.episodes,
        summary.mean_score,
        summary.last.score,
        summary.last.reward,
        summary.slope
    )))?;

    let start = summary.smoothed.len().saturating_sub(args.columns);
    let shown = &summary.smoothed[start..];
    let lo = shown.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = shown.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (hi - lo).max(f64::EPSILON);
    let level = |value: f64| ((value - lo) / span * (CHART_ROWS - 1) as f64).round() as usize;

    for row in (0..CHART_ROWS).rev() {
        let label = lo + span * row as f64 / (CHART_ROWS - 1) as f64;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("{label:>10.1} │")))?;
        for (offset, value) in shown.iter().enumerate() {
            let x = (start + offset) as f64;
            let trend = summary.intercept + summary.slope * x;
            let (glyph, color) = if level(*value) >= row {
                ("█", Color::Cyan)
            } else if level(trend.clamp(lo, hi)) == row {
                ("·", Color::Yellow)
            } else {
                (" ", Color::Reset)
            };
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(glyph))?;
        }
        out.queue(Print("\r\n"))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()
}
