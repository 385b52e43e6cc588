pub mod runner;
pub mod event;
pub mod manual;

pub use runner::{run_session, run_session_with, Session, SessionResult};
pub use event::{detect_events, EventDetector, EventKind, SimEvent};
pub use manual::{drive_manual, ManualInput};
