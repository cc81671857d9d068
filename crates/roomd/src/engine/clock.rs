use std::time::Duration;

use anyhow::Context;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::engine::EngineSender;
use super::message::EngineMessage;
use super::source::SensorSource;

/// Drives a run: polls every source for each hour, forwards the readings to
/// the engine, then asks the engine to evaluate.
pub struct Clock {
    hours: u32,
    tick_interval: Duration,
    sources: Vec<Box<dyn SensorSource>>,
}

impl Clock {
    pub fn new(hours: u32, tick_interval: Duration) -> Self {
        Self {
            hours,
            tick_interval,
            sources: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: Box<dyn SensorSource>) {
        info!("Registered sensor source: {}", source.name());
        self.sources.push(source);
    }

    /// Run to completion. Dropping `tx` afterwards lets the engine shut down.
    pub async fn run(mut self, tx: EngineSender) -> anyhow::Result<()> {
        info!("Clock starting: {} hour(s)", self.hours);

        for hour in 0..self.hours {
            debug!("Hour {}:00", hour % 24);

            for source in &mut self.sources {
                let readings = match source.poll(hour).await {
                    Ok(readings) => readings,
                    Err(e) => {
                        warn!("Source '{}' failed at hour {}: {:#}", source.name(), hour, e);
                        continue;
                    }
                };

                for (target, reading) in readings {
                    tx.send(EngineMessage::Reading { target, reading })
                        .await
                        .context("Engine stopped while delivering readings")?;
                }
            }

            tx.send(EngineMessage::Tick { hour })
                .await
                .context("Engine stopped before tick")?;

            if !self.tick_interval.is_zero() && hour + 1 < self.hours {
                tokio::time::sleep(self.tick_interval).await;
            }
        }

        info!("Clock finished");
        Ok(())
    }
}
