//! Session configuration.
//!
//! Everything a dashboard or CLI would tune before a run lives in one
//! [`SessionConfig`], loaded once and handed to the session runner.

use std::fs::read_to_string;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::pid::{DEFAULT_KP, DEFAULT_WINDUP_GUARD};
use crate::error::{self, Result};
use crate::vehicle::VehicleLimits;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One-shot configuration for a closed-loop session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    // ---- CONTROLLER ----
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,

    /// Lateral target position.
    pub setpoint: f64,

    /// Minimum interval between controller recomputations, s.
    pub sample_time: f64,

    pub enable_windup: bool,
    pub windup_guard: f64,

    // ---- VEHICLE ----
    /// Starting position `[x, y]`.
    pub initial_position: [f64; 2],

    /// Speed forced at the start of the session, units/s.
    pub initial_speed: f64,

    /// Constant longitudinal acceleration applied every step, units/s^2.
    pub acceleration: f64,

    pub vehicle: VehicleLimits,

    // ---- RUN ----
    pub max_steps: usize,

    /// Step length passed explicitly to both controller and vehicle, s.
    pub time_step: f64,

    /// Drawing area, used by manual drive and the dashboard.
    pub canvas: Canvas,

    /// Reference lines a renderer draws over the canvas.
    pub target_line: Option<TargetLine>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            kp: DEFAULT_KP,
            ki: 0.0,
            kd: 0.2,
            setpoint: 100.0,
            sample_time: 0.1,
            enable_windup: false,
            windup_guard: DEFAULT_WINDUP_GUARD,
            initial_position: [0.0, 0.0],
            initial_speed: 50.0,
            acceleration: 0.0,
            vehicle: VehicleLimits::default(),
            max_steps: 500,
            time_step: 0.1,
            canvas: Canvas::default(),
            target_line: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self { width: 1200.0, height: 400.0 }
    }
}

/// Lane-change reference drawn by a renderer: the start lane up to
/// `target_x`, then the target lane to the edge of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetLine {
    pub initial_y: Option<f64>,
    pub target_x: Option<f64>,
    pub target_y: Option<f64>,
}

/// Advisory findings about a config. None of these stop a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigWarning {
    #[error("target line is missing `{0}` and cannot be drawn")]
    TargetLineIncomplete(&'static str),

    #[error("target line y ({target_y}) differs from the controller setpoint ({setpoint})")]
    TargetLineMismatch { target_y: f64, setpoint: f64 },

    #[error("time step {0} is not positive, the vehicle will not move")]
    NonPositiveTimeStep(f64),

    #[error("max_steps is zero, the session will record nothing")]
    NoSteps,

    #[error("windup protection is enabled with a guard of {0}, which is not a positive magnitude")]
    DegenerateWindupGuard(f64),

    #[error("initial speed {speed} exceeds the vehicle limit {limit} and will be saturated")]
    InitialSpeedSaturated { speed: f64, limit: f64 },
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a session config from a TOML file.
///
/// Missing keys take their default values. Vehicle limits that are not
/// finite and positive are rejected.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SessionConfig> {
    let text = read_to_string(path).map_err(error::Error::ConfigRead)?;
    let config: SessionConfig = toml::from_str(&text)?;
    config.vehicle.validate()?;
    Ok(config)
}

impl SessionConfig {
    /// Collect advisory warnings for this config.
    pub fn check(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(line) = &self.target_line {
            if line.initial_y.is_none() {
                warnings.push(ConfigWarning::TargetLineIncomplete("initial_y"));
            }
            if line.target_x.is_none() {
                warnings.push(ConfigWarning::TargetLineIncomplete("target_x"));
            }
            match line.target_y {
                None => warnings.push(ConfigWarning::TargetLineIncomplete("target_y")),
                Some(target_y) if target_y != self.setpoint => {
                    warnings.push(ConfigWarning::TargetLineMismatch {
                        target_y,
                        setpoint: self.setpoint,
                    })
                }
                Some(_) => {}
            }
        }

        if self.time_step <= 0.0 {
            warnings.push(ConfigWarning::NonPositiveTimeStep(self.time_step));
        }
        if self.max_steps == 0 {
            warnings.push(ConfigWarning::NoSteps);
        }
        if self.enable_windup && !(self.windup_guard > 0.0) {
            warnings.push(ConfigWarning::DegenerateWindupGuard(self.windup_guard));
        }
        if self.vehicle.clamp_speed(self.initial_speed) != self.initial_speed {
            warnings.push(ConfigWarning::InitialSpeedSaturated {
                speed: self.initial_speed,
                limit: self.vehicle.max_speed.abs(),
            });
        }

        warnings
    }

    /// Run [`SessionConfig::check`] and log every warning.
    pub fn log_warnings(&self) -> usize {
        let warnings = self.check();
        for w in &warnings {
            warn!("{}", w);
        }
        warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults_match_dashboard() {
        let c = SessionConfig::default();
        assert_eq!((c.kp, c.ki, c.kd), (0.2, 0.0, 0.2));
        assert_eq!(c.setpoint, 100.0);
        assert_eq!(c.initial_position, [0.0, 0.0]);
        assert_eq!(c.max_steps, 500);
        assert_eq!(c.time_step, 0.1);
        assert!(c.check().is_empty());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let text = r#"
            kp = 0.5
            setpoint = 150.0
            initial_position = [0.0, 20.0]

            [vehicle]
            max_speed = 30.0
        "#;
        let c: SessionConfig = toml::from_str(text).unwrap();
        assert_eq!(c.kp, 0.5);
        assert_eq!(c.kd, 0.2);
        assert_eq!(c.setpoint, 150.0);
        assert_eq!(c.initial_position, [0.0, 20.0]);
        assert_eq!(c.vehicle.max_speed, 30.0);
        assert_eq!(c.vehicle.max_steering_angle, 45.0);
        assert_eq!(c.max_steps, 500);
    }

    #[test]
    fn incomplete_target_line_warns() {
        let c = SessionConfig {
            target_line: Some(TargetLine {
                initial_y: Some(0.0),
                target_x: None,
                target_y: Some(80.0),
            }),
            ..SessionConfig::default()
        };
        let warnings = c.check();
        assert!(warnings.contains(&ConfigWarning::TargetLineIncomplete("target_x")));
        assert!(warnings.contains(&ConfigWarning::TargetLineMismatch {
            target_y: 80.0,
            setpoint: 100.0
        }));
    }

    #[test]
    fn degenerate_run_settings_warn() {
        let c = SessionConfig {
            time_step: 0.0,
            max_steps: 0,
            enable_windup: true,
            windup_guard: 0.0,
            initial_speed: 80.0,
            ..SessionConfig::default()
        };
        assert_eq!(c.check().len(), 4);
    }

    #[test]
    fn bundled_config_loads_cleanly() {
        let c = load(concat!(env!("CARGO_MANIFEST_DIR"), "/configs/lane_change.toml")).unwrap();
        assert_eq!(c, SessionConfig {
            target_line: Some(TargetLine {
                initial_y: Some(0.0),
                target_x: Some(200.0),
                target_y: Some(100.0),
            }),
            ..SessionConfig::default()
        });
        assert!(c.check().is_empty());
    }

    #[test]
    fn load_rejects_negative_speed_limit() {
        let path = std::env::temp_dir().join("lane_sim_negative_limit.toml");
        std::fs::write(&path, "[vehicle]\nmax_speed = -10.0\n").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidLimit { quantity: "max_speed", .. }));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn bad_guard_and_limit_still_run() {
        let mut c = SessionConfig {
            enable_windup: true,
            windup_guard: -1.0,
            ki: 0.1,
            ..SessionConfig::default()
        };
        c.vehicle.max_speed = -10.0;
        assert!(c.check().contains(&ConfigWarning::DegenerateWindupGuard(-1.0)));
        assert!(c.check().contains(&ConfigWarning::InitialSpeedSaturated {
            speed: 50.0,
            limit: 10.0
        }));

        let result = crate::sim::Session::from_config(&c).run();
        assert_eq!(result.len(), c.max_steps);

        c.windup_guard = f64::NAN;
        c.vehicle.max_speed = f64::NAN;
        let result = crate::sim::Session::from_config(&c).run();
        assert_eq!(result.len(), c.max_steps);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load("/nonexistent/lane-sim/session.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigRead(_)));
    }

    #[test]
    fn load_reports_bad_toml() {
        let path = std::env::temp_dir().join("lane_sim_bad_config.toml");
        std::fs::write(&path, "kp = \"fast\"").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
        let _ = std::fs::remove_file(path);
    }
}
