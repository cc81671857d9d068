use tracing::info;

use crate::control::Report;

/// Destination for room reports produced on each tick.
pub trait ReportSink: Send {
    fn report(&mut self, hour: u32, report: &Report);
}

/// Logs every report as a structured `tracing` event.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&mut self, hour: u32, report: &Report) {
        info!(
            hour,
            room = %report.room,
            temperature = report.temperature,
            occupied = report.occupied,
            light_level = report.light_level,
            ac = %report.ac,
            lights = %report.lights,
            "{}",
            report
        );
    }
}

/// Keeps every report in memory, in the order received.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub reports: Vec<(u32, Report)>,
}

impl ReportSink for MemorySink {
    fn report(&mut self, hour: u32, report: &Report) {
        self.reports.push((hour, report.clone()));
    }
}
