pub mod limits;
pub mod model;

pub use limits::VehicleLimits;
pub use model::{VehicleModel, VehicleState};
