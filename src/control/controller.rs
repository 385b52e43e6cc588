/// Trait for lateral controllers.
///
/// Implement this to plug a custom controller into the session loop. The
/// runner always passes the step's time interval explicitly.
pub trait Controller {
    /// Compute a steering command (degrees) from the measured lateral position.
    fn control(&mut self, feedback: f64, dt: f64) -> f64;

    /// Reset controller internal state (e.g., PID integrators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
