//! Sensor sources used by the demo driver.

mod replay;
mod simulated;

pub use replay::ReplayError;
pub use replay::ReplaySource;
pub use simulated::SimulatedRoom;
