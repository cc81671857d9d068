use async_trait::async_trait;

use super::message::Addressed;

/// Result type for source poll calls
pub type PollResult = anyhow::Result<Vec<Addressed>>;

/// Source of sensor readings that the clock polls once per simulated hour.
#[async_trait]
pub trait SensorSource: Send {
    /// Get the name/identifier of this source
    fn name(&self) -> &str;

    /// Produce the readings observed during `hour`
    ///
    /// `hour` counts from the start of the run; sources that follow a daily
    /// pattern take it modulo 24.
    async fn poll(&mut self, hour: u32) -> PollResult;
}
