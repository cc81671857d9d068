//! Replays recorded readings from a JSON-lines file.
//!
//! Each line carries the hour it belongs to, an optional room (readings
//! without one are broadcast) and the reading in its wire shape:
//!
//! ```text
//! {"hour": 0, "room": "Living Room", "sensor_type": "pir", "occupied": true}
//! {"hour": 0, "sensor_type": "ldr", "value": 40}
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use tracing::warn;

use crate::config::MAX_HOURS;
use crate::engine::PollResult;
use crate::engine::SensorSource;
use crate::engine::Target;
use crate::sensor::RawReading;
use crate::sensor::SensorReading;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to read replay file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Malformed replay entry on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Replay entry on line {line} has hour {hour} (expected < {max})", max = MAX_HOURS)]
    HourOutOfRange { line: usize, hour: u32 },
}

#[derive(Debug, Deserialize)]
struct ReplayLine {
    hour: u32,

    #[serde(default)]
    room: Option<String>,

    #[serde(flatten)]
    reading: RawReading,
}

#[derive(Debug, Clone)]
struct Entry {
    line: usize,
    target: Target,
    reading: RawReading,
}

/// Sensor source backed by a recording.
#[derive(Debug)]
pub struct ReplaySource {
    name: String,
    entries: BTreeMap<u32, Vec<Entry>>,
}

impl ReplaySource {
    /// Load a recording from disk
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ReplayError::Io(path.to_path_buf(), e))?;

        let source = Self::parse(path.display().to_string(), &contents)?;
        info!(
            "Loaded {} replay hour(s) from {}",
            source.entries.len(),
            path.display()
        );
        Ok(source)
    }

    /// Parse a recording. Blank lines are skipped.
    pub fn parse(name: impl Into<String>, contents: &str) -> Result<Self, ReplayError> {
        let mut entries: BTreeMap<u32, Vec<Entry>> = BTreeMap::new();

        for (i, text) in contents.lines().enumerate() {
            if text.trim().is_empty() {
                continue;
            }

            let line = i + 1;
            let parsed: ReplayLine =
                serde_json::from_str(text).map_err(|source| ReplayError::Parse { line, source })?;
            if parsed.hour >= MAX_HOURS {
                return Err(ReplayError::HourOutOfRange {
                    line,
                    hour: parsed.hour,
                });
            }

            let target = match parsed.room {
                Some(room) => Target::Room(room),
                None => Target::Broadcast,
            };
            entries.entry(parsed.hour).or_default().push(Entry {
                line,
                target,
                reading: parsed.reading,
            });
        }

        Ok(Self {
            name: name.into(),
            entries,
        })
    }

    /// Last hour that has any recorded readings, always below `MAX_HOURS`
    pub fn last_hour(&self) -> Option<u32> {
        self.entries.keys().next_back().copied()
    }
}

#[async_trait]
impl SensorSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self, hour: u32) -> PollResult {
        let Some(entries) = self.entries.get(&hour) else {
            return Ok(Vec::new());
        };

        let mut readings = Vec::with_capacity(entries.len());
        for entry in entries {
            match SensorReading::try_from(entry.reading.clone()) {
                Ok(reading) => readings.push((entry.target.clone(), reading)),
                Err(e) => warn!("{}:{}: rejecting reading: {}", self.name, entry.line, e),
            }
        }
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const RECORDING: &str = r#"
{"hour": 0, "room": "Living Room", "sensor_type": "pir", "occupied": true}
{"hour": 0, "sensor_type": "ldr", "value": 40}

{"hour": 2, "room": "Living Room", "sensor_type": "temperature"}
{"hour": 2, "room": "Living Room", "sensor_type": "temperature", "value": 28}
{"hour": 2, "room": "Living Room", "sensor_type": "humidity", "value": 55}
"#;

    #[tokio::test]
    async fn test_poll_by_hour() {
        let mut source = ReplaySource::parse("recording", RECORDING).unwrap();
        assert_eq!(source.last_hour(), Some(2));

        let living_room = Target::Room("Living Room".to_string());
        assert_eq!(
            source.poll(0).await.unwrap(),
            vec![
                (living_room.clone(), SensorReading::Occupancy(true)),
                (Target::Broadcast, SensorReading::LightLevel(40)),
            ]
        );
        assert!(source.poll(1).await.unwrap().is_empty());

        // The reading missing its value is rejected; the unknown tag is kept
        assert_eq!(
            source.poll(2).await.unwrap(),
            vec![
                (living_room.clone(), SensorReading::Temperature(28.0)),
                (
                    living_room,
                    SensorReading::Unknown(Some("humidity".to_string()))
                ),
            ]
        );
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let err = ReplaySource::parse("bad", "\n{\"hour\": 0}\n{not json}\n").unwrap_err();
        assert!(matches!(err, ReplayError::Parse { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_missing_hour_is_malformed() {
        let err = ReplaySource::parse("bad", r#"{"sensor_type": "pir", "occupied": true}"#)
            .unwrap_err();
        assert!(matches!(err, ReplayError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_hour_beyond_a_year_is_rejected() {
        let recording = format!(
            "{{\"hour\": 1, \"sensor_type\": \"pir\", \"occupied\": true}}\n\
             {{\"hour\": {}, \"sensor_type\": \"pir\", \"occupied\": true}}\n",
            u32::MAX
        );
        let err = ReplaySource::parse("bad", &recording).unwrap_err();
        assert!(
            matches!(err, ReplayError::HourOutOfRange { line: 2, hour } if hour == u32::MAX),
            "{err}"
        );

        let at_hour = |hour: u32| format!(r#"{{"hour": {hour}, "sensor_type": "ldr", "value": 5}}"#);
        let source = ReplaySource::parse("edge", &at_hour(MAX_HOURS - 1)).unwrap();
        assert_eq!(source.last_hour(), Some(MAX_HOURS - 1));
        assert!(matches!(
            ReplaySource::parse("over", &at_hour(MAX_HOURS)),
            Err(ReplayError::HourOutOfRange { line: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_mistyped_fields_are_skipped_not_fatal() {
        let recording = r#"
{"hour": 0, "room": "Living Room", "sensor_type": "pir", "occupied": "yes"}
{"hour": 0, "room": "Living Room", "sensor_type": "motion", "occupied": 1}
{"hour": 0, "room": "Living Room", "sensor_type": "pir", "occupied": true}
"#;
        let mut source = ReplaySource::parse("recording", recording).unwrap();
        let living_room = Target::Room("Living Room".to_string());
        assert_eq!(
            source.poll(0).await.unwrap(),
            vec![
                (
                    living_room.clone(),
                    SensorReading::Unknown(Some("motion".to_string()))
                ),
                (living_room, SensorReading::Occupancy(true)),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"hour": 5, "sensor_type": "pir", "occupied": false}}"#).unwrap();

        let mut source = ReplaySource::load(file.path()).await.unwrap();
        assert_eq!(source.last_hour(), Some(5));
        assert_eq!(
            source.poll(5).await.unwrap(),
            vec![(Target::Broadcast, SensorReading::Occupancy(false))]
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = ReplaySource::load(dir.path().join("missing.jsonl"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReplayError::Io(..)));
    }
}
