use nalgebra::Vector2;

use super::runner::SessionResult;

// ---------------------------------------------------------------------------
// Session events
// ---------------------------------------------------------------------------

/// Kinds of session events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Lateral position crossed the setpoint.
    TargetCrossed { upward: bool },
    /// Lateral position entered the band at `since` and stayed in it.
    Settled { since: f64 },
    /// Vehicle reached the right edge of the canvas.
    LeftCanvas,
}

/// One recorded point of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub position: Vector2<f64>,
}

/// A discrete event that occurred during a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    pub position: Vector2<f64>,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive samples and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind>;
}

/// Fires every time the lateral position crosses the setpoint.
pub struct TargetCrossingDetector {
    pub setpoint: f64,
}

impl EventDetector for TargetCrossingDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind> {
        let before = prev.position.y - self.setpoint;
        let after = current.position.y - self.setpoint;
        if before < 0.0 && after >= 0.0 {
            Some(EventKind::TargetCrossed { upward: true })
        } else if before > 0.0 && after <= 0.0 {
            Some(EventKind::TargetCrossed { upward: false })
        } else {
            None
        }
    }
}

/// Fires once when the lateral error has stayed within `band` for `hold`
/// consecutive samples.
pub struct SettlingDetector {
    pub setpoint: f64,
    pub band: f64,
    pub hold: usize,
    entered: Option<f64>,
    count: usize,
    fired: bool,
}

impl SettlingDetector {
    pub fn new(setpoint: f64, band: f64, hold: usize) -> Self {
        Self { setpoint, band, hold: hold.max(1), entered: None, count: 0, fired: false }
    }
}

impl EventDetector for SettlingDetector {
    fn check(&mut self, _prev: &Sample, current: &Sample) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        if (current.position.y - self.setpoint).abs() > self.band {
            self.entered = None;
            self.count = 0;
            return None;
        }
        let since = *self.entered.get_or_insert(current.time);
        self.count += 1;
        if self.count >= self.hold {
            self.fired = true;
            Some(EventKind::Settled { since })
        } else {
            None
        }
    }
}

/// Fires once when `x` reaches the canvas width.
pub struct BoundaryDetector {
    pub width: f64,
    fired: bool,
}

impl BoundaryDetector {
    pub fn new(width: f64) -> Self {
        Self { width, fired: false }
    }
}

impl EventDetector for BoundaryDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        if prev.position.x < self.width && current.position.x >= self.width {
            self.fired = true;
            Some(EventKind::LeftCanvas)
        } else {
            None
        }
    }
}

/// Replay a session through the given detectors, oldest event first.
///
/// The starting position at time zero is the first `prev` sample.
pub fn detect_events(result: &SessionResult, detectors: &mut [&mut dyn EventDetector]) -> Vec<SimEvent> {
    let mut events = Vec::new();
    let mut prev = Sample { time: 0.0, position: result.initial_position };

    for (&time, &position) in result.times.iter().zip(&result.trajectory) {
        let current = Sample { time, position };
        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(&prev, &current) {
                events.push(SimEvent { time, kind, position });
            }
        }
        prev = current;
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::sim::Session;

    fn sample(time: f64, x: f64, y: f64) -> Sample {
        Sample { time, position: Vector2::new(x, y) }
    }

    #[test]
    fn crossing_detected_both_ways() {
        let mut det = TargetCrossingDetector { setpoint: 10.0 };
        assert_eq!(
            det.check(&sample(0.0, 0.0, 9.0), &sample(0.1, 1.0, 11.0)),
            Some(EventKind::TargetCrossed { upward: true })
        );
        assert_eq!(
            det.check(&sample(0.1, 1.0, 11.0), &sample(0.2, 2.0, 10.0)),
            Some(EventKind::TargetCrossed { upward: false })
        );
        assert!(det.check(&sample(0.2, 2.0, 10.0), &sample(0.3, 3.0, 10.0)).is_none());
    }

    #[test]
    fn settling_requires_hold() {
        let mut det = SettlingDetector::new(0.0, 1.0, 3);
        let prev = sample(0.0, 0.0, 0.0);
        assert!(det.check(&prev, &sample(0.1, 0.0, 0.5)).is_none());
        assert!(det.check(&prev, &sample(0.2, 0.0, 2.0)).is_none());
        assert!(det.check(&prev, &sample(0.3, 0.0, 0.2)).is_none());
        assert!(det.check(&prev, &sample(0.4, 0.0, -0.2)).is_none());
        assert_eq!(
            det.check(&prev, &sample(0.5, 0.0, 0.1)),
            Some(EventKind::Settled { since: 0.3 })
        );
        // Should not fire again
        assert!(det.check(&prev, &sample(0.6, 0.0, 0.1)).is_none());
    }

    #[test]
    fn boundary_fires_once() {
        let mut det = BoundaryDetector::new(1200.0);
        assert_eq!(
            det.check(&sample(0.0, 1199.0, 0.0), &sample(0.1, 1201.0, 0.0)),
            Some(EventKind::LeftCanvas)
        );
        assert!(det.check(&sample(0.1, 1199.0, 0.0), &sample(0.2, 1201.0, 0.0)).is_none());
    }

    #[test]
    fn default_session_crosses_and_leaves_canvas() {
        let mut session = Session::from_config(&SessionConfig::default());
        let result = session.run();

        let mut crossing = TargetCrossingDetector { setpoint: 100.0 };
        let mut boundary = BoundaryDetector::new(1200.0);
        let mut detectors: [&mut dyn EventDetector; 2] = [&mut crossing, &mut boundary];
        let events = detect_events(&result, &mut detectors);

        let first = events.first().unwrap();
        assert_eq!(first.kind, EventKind::TargetCrossed { upward: true });
        assert!(events.iter().any(|e| e.kind == EventKind::LeftCanvas));
        assert!(events.windows(2).all(|w| w[0].time <= w[1].time));
    }
}
