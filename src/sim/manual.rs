use log::debug;

use crate::error::Result;
use crate::vehicle::{VehicleLimits, VehicleModel};

// ---------------------------------------------------------------------------
// Manual (keyboard) drive
// ---------------------------------------------------------------------------

/// Key state sampled once per frame by whatever owns the keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub quit: bool,
}

impl ManualInput {
    /// Map keys to full-magnitude `(steering_angle, acceleration)` commands.
    /// `down` wins over `up` and `right` over `left`.
    pub fn command(&self, limits: &VehicleLimits) -> (f64, f64) {
        let mut acceleration = 0.0;
        if self.up {
            acceleration = limits.max_acceleration;
        }
        if self.down {
            acceleration = -limits.max_acceleration;
        }

        let mut steering = 0.0;
        if self.left {
            steering = -limits.max_steering_angle;
        }
        if self.right {
            steering = limits.max_steering_angle;
        }

        (steering, acceleration)
    }
}

/// Drive `model` from a stream of key states through the strict input path.
///
/// Stops when the inputs run out, `quit` is pressed, or the vehicle reaches
/// `boundary_x`. Returns the number of steps taken.
pub fn drive_manual<I>(model: &mut VehicleModel, inputs: I, boundary_x: f64) -> Result<usize>
where
    I: IntoIterator<Item = ManualInput>,
{
    let limits = *model.limits();
    let mut steps = 0;

    for input in inputs {
        if input.quit {
            debug!("manual drive stopped by user after {} steps", steps);
            break;
        }
        let (steering, acceleration) = input.command(&limits);
        let state = model.update_strict(steering, acceleration, limits.time_step)?;
        steps += 1;

        if state.position.x >= boundary_x {
            debug!("manual drive reached x = {:.1} after {} steps", state.position.x, steps);
            break;
        }
    }

    Ok(steps)
}
