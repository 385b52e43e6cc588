pub mod config;
pub mod control;
pub mod error;
pub mod io;
pub mod logging;
pub mod sim;
pub mod vehicle;

pub use config::SessionConfig;
pub use control::{Controller, PidController};
pub use error::{Error, Result};
pub use sim::{run_session, Session, SessionResult};
pub use vehicle::{VehicleLimits, VehicleModel};
