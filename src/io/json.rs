use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::sim::SessionResult;

/// Fraction of the initial lateral offset used as the settling band.
pub const SETTLING_BAND_FRACTION: f64 = 0.02;

/// Half-width of the settling band around `setpoint` for a run starting at
/// `start_y`. Never zero, so an on-target start still has a band.
pub fn settling_band(setpoint: f64, start_y: f64) -> f64 {
    (SETTLING_BAND_FRACTION * (setpoint - start_y).abs()).max(f64::EPSILON)
}

/// Summary statistics computed from a session record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub steps: usize,
    pub duration_s: f64,
    pub setpoint: f64,
    pub final_x: f64,
    pub final_y: f64,
    /// `setpoint - final_y`
    pub final_error: f64,
    /// Largest excursion past the setpoint, away from the start side.
    pub max_overshoot: f64,
    /// First time the setpoint was reached.
    pub rise_time_s: Option<f64>,
    /// Time after which the error stays inside the settling band.
    pub settling_time_s: Option<f64>,
    pub path_length: f64,
}

impl SessionSummary {
    /// Compute a summary, or `None` for an empty session.
    pub fn from_result(result: &SessionResult, setpoint: f64) -> Option<Self> {
        let last = *result.trajectory.last()?;
        let duration_s = result.times.last().copied().unwrap_or(0.0);

        let start_y = result.initial_position.y;
        // +1 when approaching from below, -1 from above
        let side = if start_y <= setpoint { 1.0 } else { -1.0 };

        let max_overshoot = result
            .y_positions()
            .map(|y| side * (y - setpoint))
            .fold(0.0_f64, f64::max);

        let rise_time_s = result
            .times
            .iter()
            .zip(result.y_positions())
            .find(|(_, y)| side * (y - setpoint) >= 0.0)
            .map(|(t, _)| *t);

        let band = settling_band(setpoint, start_y);
        let settling_time_s = match result
            .trajectory
            .iter()
            .rposition(|p| (p.y - setpoint).abs() > band)
        {
            None => result.times.first().copied(),
            Some(i) => result.times.get(i + 1).copied(),
        };

        let mut path_length = 0.0;
        let mut prev = result.initial_position;
        for p in &result.trajectory {
            path_length += (p - prev).norm();
            prev = *p;
        }

        Some(SessionSummary {
            steps: result.len(),
            duration_s,
            setpoint,
            final_x: last.x,
            final_y: last.y,
            final_error: setpoint - last.y,
            max_overshoot,
            rise_time_s,
            settling_time_s,
            path_length,
        })
    }
}

#[derive(Serialize)]
struct Report<'a> {
    session: &'a SessionConfig,
    performance: &'a SessionSummary,
}

/// Write the session config and its summary as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    config: &SessionConfig,
    summary: &SessionSummary,
) -> Result<()> {
    let report = Report { session: config, performance: summary };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

/// Write the summary JSON to a file.
pub fn write_summary_file<P: AsRef<Path>>(
    path: P,
    config: &SessionConfig,
    summary: &SessionSummary,
) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, config, summary)
}
