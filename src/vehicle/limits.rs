use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Vehicle limits
// ---------------------------------------------------------------------------

/// Actuation and geometry limits of the simulated car.
///
/// Units are abstract canvas units (one unit per pixel in the dashboard).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleLimits {
    /// Default integration step, s
    pub time_step: f64,
    /// Steering magnitude bound, deg
    pub max_steering_angle: f64,
    /// Acceleration magnitude bound, units/s^2
    pub max_acceleration: f64,
    /// Speed magnitude bound, units/s
    pub max_speed: f64,
    /// Effective wheelbase used as the turning-radius divisor, units
    pub wheelbase: f64,
}

impl Default for VehicleLimits {
    fn default() -> Self {
        Self {
            time_step: 0.1,
            max_steering_angle: 45.0,
            max_acceleration: 10.0,
            max_speed: 50.0,
            wheelbase: 50.0,
        }
    }
}

impl VehicleLimits {
    /// Fail with [`Error::InvalidLimit`] unless every bound and the wheelbase
    /// is finite and positive.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("time_step", self.time_step),
            ("max_steering_angle", self.max_steering_angle),
            ("max_acceleration", self.max_acceleration),
            ("max_speed", self.max_speed),
            ("wheelbase", self.wheelbase),
        ];
        for (quantity, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidLimit { quantity, value });
            }
        }
        Ok(())
    }

    pub fn clamp_steering(&self, steering_angle: f64) -> f64 {
        saturate(steering_angle, self.max_steering_angle)
    }

    pub fn clamp_acceleration(&self, acceleration: f64) -> f64 {
        saturate(acceleration, self.max_acceleration)
    }

    pub fn clamp_speed(&self, speed: f64) -> f64 {
        saturate(speed, self.max_speed)
    }
}

/// Bound `value` to `[-|limit|, |limit|]`. A NaN limit bounds nothing.
fn saturate(value: f64, limit: f64) -> f64 {
    let limit = limit.abs();
    if value < -limit {
        -limit
    } else if value > limit {
        limit
    } else {
        value
    }
}
