use log::trace;
use nalgebra::Vector2;
use serde::Serialize;

use super::limits::VehicleLimits;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Kinematic state snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleState {
    pub position: Vector2<f64>, // units, canvas frame
    pub orientation: f64,       // deg, CCW from +x, in [0, 360)
    pub speed: f64,             // units/s, signed
}

// ---------------------------------------------------------------------------
// Kinematic bicycle model
// ---------------------------------------------------------------------------

/// Kinematic bicycle model with a single effective wheelbase.
///
/// Two entry points advance the model:
///   - [`VehicleModel::update`] saturates out-of-range commands silently.
///   - [`VehicleModel::update_strict`] rejects them before touching any state.
///
/// They share only the integration step. Do not pre-clamp commands and then
/// feed them to the strict path, or validate and then clamp: each call goes
/// through exactly one policy.
#[derive(Debug, Clone)]
pub struct VehicleModel {
    limits: VehicleLimits,
    position: Vector2<f64>,
    orientation: f64,
    speed: f64,
    trajectory: Vec<Vector2<f64>>,
}

impl VehicleModel {
    pub fn new(limits: VehicleLimits) -> Self {
        Self {
            limits,
            position: Vector2::zeros(),
            orientation: 0.0,
            speed: 0.0,
            trajectory: Vec::new(),
        }
    }

    /// Reinitialise position and speed, zero the heading and drop the trajectory.
    pub fn reset(&mut self, initial_position: Vector2<f64>, initial_speed: f64) {
        self.position = initial_position;
        self.speed = self.limits.clamp_speed(initial_speed);
        self.orientation = 0.0;
        self.trajectory.clear();
    }

    /// Advance one step with commands saturated to the configured limits.
    pub fn update(&mut self, steering_angle: f64, acceleration: f64, time_step: f64) -> VehicleState {
        let steering_angle = self.limits.clamp_steering(steering_angle);
        let acceleration = self.limits.clamp_acceleration(acceleration);
        self.integrate(steering_angle, acceleration, time_step)
    }

    /// Same as [`VehicleModel::update`] with the default time step.
    pub fn step(&mut self, steering_angle: f64, acceleration: f64) -> VehicleState {
        self.update(steering_angle, acceleration, self.limits.time_step)
    }

    /// Advance one step, failing with [`Error::InvalidInput`] if a command
    /// exceeds its bound. On error the model is left unchanged.
    pub fn update_strict(
        &mut self,
        steering_angle: f64,
        acceleration: f64,
        time_step: f64,
    ) -> Result<VehicleState> {
        check_magnitude("steering angle", steering_angle, self.limits.max_steering_angle)?;
        check_magnitude("acceleration", acceleration, self.limits.max_acceleration)?;
        Ok(self.integrate(steering_angle, acceleration, time_step))
    }

    fn integrate(&mut self, steering_angle: f64, acceleration: f64, dt: f64) -> VehicleState {
        self.speed = self.limits.clamp_speed(self.speed + acceleration * dt);

        let heading_change =
            (self.speed / self.limits.wheelbase) * steering_angle.to_radians().tan() * dt;
        self.orientation = wrap_degrees(self.orientation + heading_change.to_degrees());

        let heading = self.orientation.to_radians();
        self.position += Vector2::new(heading.cos(), heading.sin()) * (self.speed * dt);
        self.trajectory.push(self.position);

        trace!(
            "vehicle at ({:.3}, {:.3}) heading {:.3} deg speed {:.3}",
            self.position.x,
            self.position.y,
            self.orientation,
            self.speed
        );

        self.state()
    }

    pub fn state(&self) -> VehicleState {
        VehicleState {
            position: self.position,
            orientation: self.orientation,
            speed: self.speed,
        }
    }

    pub fn position(&self) -> Vector2<f64> {
        self.position
    }

    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Overwrite the speed, saturated to the speed limit.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = self.limits.clamp_speed(speed);
    }

    pub fn limits(&self) -> &VehicleLimits {
        &self.limits
    }

    /// Positions recorded since the last reset, oldest first.
    pub fn trajectory(&self) -> &[Vector2<f64>] {
        &self.trajectory
    }
}

impl Default for VehicleModel {
    fn default() -> Self {
        Self::new(VehicleLimits::default())
    }
}

fn check_magnitude(quantity: &'static str, value: f64, limit: f64) -> Result<()> {
    // Written so that NaN fails the check too.
    if !(value.abs() <= limit) {
        return Err(Error::InvalidInput { quantity, value, limit });
    }
    Ok(())
}

/// Wrap an angle in degrees to [0, 360).
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
