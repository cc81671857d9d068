//! Actuator state machines and the per-room controller that drives them.

mod ac;
mod light;
mod room;

pub use ac::AcController;
pub use ac::AcState;
pub use ac::COOLING_OFF_CELSIUS;
pub use ac::COOLING_ON_CELSIUS;
pub use light::DARK_THRESHOLD;
pub use light::LightController;
pub use light::LightState;
pub use room::Report;
pub use room::RoomController;
