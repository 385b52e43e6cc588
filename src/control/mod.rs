pub mod clock;
pub mod controller;
pub mod pid;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::Controller;
pub use pid::PidController;
