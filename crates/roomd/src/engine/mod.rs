mod clock;
// Private module - the public surface is re-exported below
#[allow(clippy::module_inception)]
mod engine;
mod message;
mod report;
mod source;
pub mod state;

pub use clock::Clock;
pub use engine::Engine;
pub use engine::EngineError;
pub use engine::EngineSender;
pub use message::Addressed;
pub use message::EngineMessage;
pub use message::Target;
pub use report::MemorySink;
pub use report::ReportSink;
pub use report::TracingSink;
pub use source::PollResult;
pub use source::SensorSource;
pub use state::State;
