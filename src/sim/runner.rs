use log::debug;
use nalgebra::Vector2;

use crate::config::SessionConfig;
use crate::control::{Controller, PidController};
use crate::vehicle::VehicleModel;

/// Speed forced at the start of every controlled session, units/s.
pub const SESSION_START_SPEED: f64 = 50.0;

// ---------------------------------------------------------------------------
// Session result
// ---------------------------------------------------------------------------

/// Everything recorded during one closed-loop session.
#[derive(Debug, Clone)]
pub struct SessionResult {
    /// Time at which each trajectory point was reached, s.
    pub times: Vec<f64>,
    pub trajectory: Vec<Vector2<f64>>,
    /// Steering command issued at each step, before vehicle saturation, deg.
    pub steering: Vec<f64>,
    /// Target the controller tracked, when the runner knows it.
    pub setpoint: Option<f64>,
    pub initial_position: Vector2<f64>,
}

impl SessionResult {
    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }

    pub fn x_positions(&self) -> impl Iterator<Item = f64> + '_ {
        self.trajectory.iter().map(|p| p.x)
    }

    pub fn y_positions(&self) -> impl Iterator<Item = f64> + '_ {
        self.trajectory.iter().map(|p| p.y)
    }
}

// ---------------------------------------------------------------------------
// Closed-loop stepping
// ---------------------------------------------------------------------------

struct LoopSettings {
    initial_position: Vector2<f64>,
    initial_speed: f64,
    acceleration: f64,
    max_steps: usize,
    time_step: f64,
}

/// Reset the vehicle, then run exactly `max_steps` steps, asking `command`
/// for a steering angle from the lateral position each step.
fn closed_loop(
    model: &mut VehicleModel,
    settings: &LoopSettings,
    setpoint: Option<f64>,
    mut command: impl FnMut(f64, f64) -> f64,
) -> SessionResult {
    model.reset(settings.initial_position, 0.0);
    model.set_speed(settings.initial_speed);

    let mut result = SessionResult {
        times: Vec::with_capacity(settings.max_steps),
        trajectory: Vec::with_capacity(settings.max_steps),
        steering: Vec::with_capacity(settings.max_steps),
        setpoint,
        initial_position: settings.initial_position,
    };

    for step in 0..settings.max_steps {
        let feedback = model.position().y;
        let steering = command(feedback, settings.time_step);
        let state = model.update(steering, settings.acceleration, settings.time_step);

        result.times.push((step + 1) as f64 * settings.time_step);
        result.trajectory.push(state.position);
        result.steering.push(steering);
    }

    result
}

/// Run a closed-loop session with any [`Controller`] and return the
/// trajectory. Always returns exactly `max_steps` points.
pub fn run_session(
    model: &mut VehicleModel,
    controller: &mut dyn Controller,
    initial_position: Vector2<f64>,
    max_steps: usize,
    time_step: f64,
) -> Vec<Vector2<f64>> {
    run_session_with(
        model,
        controller,
        initial_position,
        SESSION_START_SPEED,
        max_steps,
        time_step,
    )
    .trajectory
}

/// Run a closed-loop session with a custom start speed and return the full
/// record.
pub fn run_session_with(
    model: &mut VehicleModel,
    controller: &mut dyn Controller,
    initial_position: Vector2<f64>,
    initial_speed: f64,
    max_steps: usize,
    time_step: f64,
) -> SessionResult {
    debug!(
        "running {} for {} steps of {} s from ({}, {})",
        controller.name(),
        max_steps,
        time_step,
        initial_position.x,
        initial_position.y
    );
    let settings = LoopSettings {
        initial_position,
        initial_speed,
        acceleration: 0.0,
        max_steps,
        time_step,
    };
    closed_loop(model, &settings, None, |feedback, dt| controller.control(feedback, dt))
}

// ---------------------------------------------------------------------------
// Configured session
// ---------------------------------------------------------------------------

/// A PID controller and vehicle built from one [`SessionConfig`].
///
/// A dashboard keeps one of these around, pushes slider values through
/// [`Session::controller_mut`] and calls [`Session::run`] again.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    controller: PidController,
    model: VehicleModel,
}

impl Session {
    pub fn from_config(config: &SessionConfig) -> Self {
        config.log_warnings();

        let mut controller = PidController::new(config.kp, config.ki, config.kd);
        controller.set_target(config.setpoint);
        controller.set_sample_time(config.sample_time);
        controller.set_windup_guard(config.windup_guard);

        Self {
            config: config.clone(),
            controller,
            model: VehicleModel::new(config.vehicle),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn controller(&self) -> &PidController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PidController {
        &mut self.controller
    }

    pub fn model(&self) -> &VehicleModel {
        &self.model
    }

    /// Move the start position; takes effect on the next run.
    pub fn set_initial_position(&mut self, position: Vector2<f64>) {
        self.config.initial_position = [position.x, position.y];
    }

    /// Run from a fresh controller state (gains and setpoint kept).
    pub fn run(&mut self) -> SessionResult {
        Controller::reset(&mut self.controller);

        let [x, y] = self.config.initial_position;
        let settings = LoopSettings {
            initial_position: Vector2::new(x, y),
            initial_speed: self.config.initial_speed,
            acceleration: self.config.acceleration,
            max_steps: self.config.max_steps,
            time_step: self.config.time_step,
        };
        let enable_windup = self.config.enable_windup;
        let setpoint = self.controller.setpoint();
        let controller = &mut self.controller;

        let result = closed_loop(&mut self.model, &settings, Some(setpoint), |feedback, dt| {
            controller.update(feedback, enable_windup, Some(dt))
        });

        debug!(
            "session finished after {} steps at ({:.2}, {:.2}), setpoint {}",
            result.len(),
            self.model.position().x,
            self.model.position().y,
            setpoint
        );
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn default_pid() -> PidController {
        let mut pid = PidController::new(0.2, 0.0, 0.2);
        pid.set_sample_time(0.1);
        pid.set_target(100.0);
        pid
    }

    #[test]
    fn session_has_exact_length() {
        let mut model = VehicleModel::default();
        let mut pid = default_pid();
        let traj = run_session(&mut model, &mut pid, Vector2::zeros(), 500, 0.1);
        assert_eq!(traj.len(), 500);
        assert_eq!(model.trajectory(), traj.as_slice());
    }

    #[test]
    fn x_increases_while_moving_forward() {
        let mut model = VehicleModel::default();
        let mut pid = PidController::new(0.2, 0.0, 0.0);
        pid.set_target(100.0);
        let traj = run_session(&mut model, &mut pid, Vector2::zeros(), 500, 0.1);
        for pair in traj.windows(2) {
            assert!(pair[1].x > pair[0].x, "x went from {} to {}", pair[0].x, pair[1].x);
        }
    }

    #[test]
    fn pd_controller_reaches_setpoint() {
        let mut model = VehicleModel::default();
        let mut pid = default_pid();
        let traj = run_session(&mut model, &mut pid, Vector2::zeros(), 500, 0.1);
        let last = traj.last().unwrap();
        assert!((last.y - 100.0).abs() < 2.0, "final y {}", last.y);
    }

    /// Fixed-magnitude steering toward the target.
    struct BangBang {
        target: f64,
        calls: usize,
    }

    impl Controller for BangBang {
        fn control(&mut self, feedback: f64, _dt: f64) -> f64 {
            self.calls += 1;
            if feedback < self.target { 10.0 } else { -10.0 }
        }

        fn name(&self) -> &str {
            "BangBang"
        }
    }

    #[test]
    fn custom_controller_plugs_in() {
        let mut model = VehicleModel::default();
        let mut ctrl = BangBang { target: 30.0, calls: 0 };
        let result = run_session_with(&mut model, &mut ctrl, Vector2::zeros(), 20.0, 300, 0.1);
        assert_eq!(ctrl.calls, 300);
        assert_eq!(result.len(), 300);
        assert_eq!(result.setpoint, None);
        assert!(result.steering.iter().all(|s| s.abs() == 10.0));
        assert!(result.trajectory.iter().any(|p| p.y > 30.0));
    }

    #[test]
    fn zero_steps_records_nothing() {
        let mut model = VehicleModel::default();
        let mut pid = default_pid();
        let traj = run_session(&mut model, &mut pid, Vector2::new(0.0, 50.0), 0, 0.1);
        assert!(traj.is_empty());
        assert_eq!(model.position(), Vector2::new(0.0, 50.0));
    }

    #[test]
    fn on_target_start_drives_straight() {
        let mut model = VehicleModel::default();
        let mut pid = default_pid();
        let traj = run_session(&mut model, &mut pid, Vector2::new(0.0, 100.0), 20, 0.1);
        for p in &traj {
            assert!((p.y - 100.0).abs() < 1e-9);
        }
        assert!((traj[19].x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn configured_session_is_repeatable() {
        let config = SessionConfig::default();
        let mut session = Session::from_config(&config);
        let first = session.run();
        let second = session.run();
        assert_eq!(first.trajectory, second.trajectory);
        assert_eq!(first.len(), config.max_steps);
        assert!((first.times[0] - 0.1).abs() < 1e-12);
        assert!((first.times[499] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn configured_session_matches_plain_runner() {
        let config = SessionConfig::default();
        let mut session = Session::from_config(&config);
        let configured = session.run();

        let mut model = VehicleModel::default();
        let mut pid = default_pid();
        let plain = run_session(&mut model, &mut pid, Vector2::zeros(), 500, 0.1);
        assert_eq!(configured.trajectory, plain);
    }

    #[test]
    fn slider_changes_apply_on_next_run() {
        let mut session = Session::from_config(&SessionConfig::default());
        let before = session.run();
        session.controller_mut().set_gains(1.0, 0.0, 0.5);
        session.controller_mut().set_target(150.0);
        session.set_initial_position(Vector2::new(0.0, 20.0));
        let after = session.run();
        assert_eq!(after.setpoint, Some(150.0));
        assert_eq!(after.initial_position, Vector2::new(0.0, 20.0));
        assert_ne!(before.trajectory, after.trajectory);
    }

    #[test]
    fn steering_record_is_unsaturated() {
        let mut session = Session::from_config(&SessionConfig::default());
        let result = session.run();
        // error 100 over 0.1 s gives a large derivative kick on the first step
        assert!(result.steering[0] > 45.0);
    }
}
