use super::clock::{Clock, SystemClock};
use super::controller::Controller;

pub const DEFAULT_KP: f64 = 0.2;
pub const DEFAULT_WINDUP_GUARD: f64 = 20.0;

// ---------------------------------------------------------------------------
// PID Controller (single axis, sample-time gated)
// ---------------------------------------------------------------------------

/// Single-axis PID controller tracking a setpoint.
///
/// The controller recomputes its output only when at least `sample_time`
/// seconds have elapsed on its clock since the last computation, or when the
/// caller passes an explicit delta time. Between computations `update`
/// returns the cached output and leaves every internal field untouched.
#[derive(Debug, Clone)]
pub struct PidController<C: Clock = SystemClock> {
    kp: f64,
    ki: f64,
    kd: f64,
    setpoint: f64,
    sample_time: f64,
    windup_guard: f64,
    integral: f64,
    last_error: f64,
    output: f64,
    last_time: f64,
    clock: C,
}

impl PidController<SystemClock> {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self::with_clock(kp, ki, kd, SystemClock::new())
    }
}

impl Default for PidController<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_KP, 0.0, 0.0)
    }
}

impl<C: Clock> PidController<C> {
    pub fn with_clock(kp: f64, ki: f64, kd: f64, clock: C) -> Self {
        let last_time = clock.now();
        Self {
            kp,
            ki,
            kd,
            setpoint: 0.0,
            sample_time: 0.0,
            windup_guard: DEFAULT_WINDUP_GUARD,
            integral: 0.0,
            last_error: 0.0,
            output: 0.0,
            last_time,
            clock,
        }
    }

    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    pub fn set_kp(&mut self, kp: f64) {
        self.kp = kp;
    }

    pub fn set_ki(&mut self, ki: f64) {
        self.ki = ki;
    }

    pub fn set_kd(&mut self, kd: f64) {
        self.kd = kd;
    }

    pub fn set_target(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Minimum interval between recomputations, in seconds. Zero recomputes
    /// on every call.
    pub fn set_sample_time(&mut self, sample_time: f64) {
        self.sample_time = sample_time;
    }

    /// Symmetric bound on the integral accumulator. Only applied by updates
    /// that enable windup protection; the sign is ignored and a NaN guard
    /// leaves the integral unbounded.
    pub fn set_windup_guard(&mut self, guard: f64) {
        self.windup_guard = guard;
    }

    /// Zero the setpoint, accumulated error state and output. Gains and
    /// sample time are kept; the windup guard returns to its default.
    pub fn clear(&mut self) {
        self.setpoint = 0.0;
        self.integral = 0.0;
        self.last_error = 0.0;
        self.output = 0.0;
        self.windup_guard = DEFAULT_WINDUP_GUARD;
    }

    /// Compute the control output for a measured `feedback` value.
    ///
    /// With `explicit_dt` set, that interval is used and the output is always
    /// recomputed. Otherwise the interval is read from the clock and the
    /// sample-time gate applies.
    pub fn update(&mut self, feedback: f64, enable_windup: bool, explicit_dt: Option<f64>) -> f64 {
        let error = self.setpoint - feedback;
        let delta_error = error - self.last_error;

        let now = self.clock.now();
        let dt = explicit_dt.unwrap_or(now - self.last_time);

        if dt < self.sample_time && explicit_dt.is_none() {
            return self.output;
        }

        let p_term = self.kp * error;

        self.integral += error * dt;
        if enable_windup {
            let guard = self.windup_guard.abs();
            if self.integral < -guard {
                self.integral = -guard;
            } else if self.integral > guard {
                self.integral = guard;
            }
        }

        let d_term = if dt > 0.0 { delta_error / dt } else { 0.0 };

        self.last_time = now;
        self.last_error = error;

        self.output = p_term + self.ki * self.integral + self.kd * d_term;
        self.output
    }

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn ki(&self) -> f64 {
        self.ki
    }

    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn sample_time(&self) -> f64 {
        self.sample_time
    }

    pub fn windup_guard(&self) -> f64 {
        self.windup_guard
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    /// Output of the most recent computation.
    pub fn output(&self) -> f64 {
        self.output
    }
}

impl<C: Clock> Controller for PidController<C> {
    fn control(&mut self, feedback: f64, dt: f64) -> f64 {
        self.update(feedback, false, Some(dt))
    }

    /// Zero the accumulated state, keeping the setpoint and windup guard.
    fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
        self.output = 0.0;
    }

    fn name(&self) -> &str {
        "PidController"
    }
}
