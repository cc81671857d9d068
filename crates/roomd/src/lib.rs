pub mod api;
pub mod config;
mod control;
pub mod engine;
pub mod sensor;
pub mod sources;

pub use config::Config;
pub use config::LogLevel;
pub use control::AcController;
pub use control::AcState;
pub use control::COOLING_OFF_CELSIUS;
pub use control::COOLING_ON_CELSIUS;
pub use control::DARK_THRESHOLD;
pub use control::LightController;
pub use control::LightState;
pub use control::Report;
pub use control::RoomController;
pub use engine::Engine;
pub use engine::State;
pub use sensor::SensorObserver;
pub use sensor::SensorReading;
