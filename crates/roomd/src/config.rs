//! Configuration file parsing and structures.
//!
//! roomd uses TOML for declarative configuration. Every section is optional;
//! an empty file describes a single living room simulated over one day.
//! Control thresholds are fixed and deliberately not configurable.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::filter::Targets;

/// Longest run the simulation accepts, in hours
pub const MAX_HOURS: u32 = 24 * 365;

/// Top-level configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default = "default_rooms")]
    pub rooms: Vec<RoomConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            simulation: SimulationConfig::default(),
            api: ApiConfig::default(),
            rooms: default_rooms(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,

    /// Per-target levels, e.g. `"roomd::engine" = "debug"`
    #[serde(default)]
    pub overrides: HashMap<String, LogLevel>,
}

impl LoggingConfig {
    /// Build a target filter from the default level and per-target overrides
    pub fn filter(&self) -> Targets {
        self.overrides.iter().fold(
            Targets::new().with_default(LevelFilter::from(self.level)),
            |targets, (target, level)| targets.with_target(target.clone(), LevelFilter::from(*level)),
        )
    }
}

/// How the demo clock advances
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    /// Number of simulated hours to run
    #[serde(default = "default_hours")]
    pub hours: u32,

    /// Real time to wait between simulated hours
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Daily temperature swing above and below each room's base temperature
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            hours: default_hours(),
            tick_interval_ms: 0,
            amplitude: default_amplitude(),
        }
    }
}

/// Read-only HTTP status API
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: default_listen(),
            port: default_port(),
        }
    }
}

/// A simulated room
#[derive(Debug, Clone, Deserialize)]
pub struct RoomConfig {
    pub name: String,

    /// Mean temperature over the day, in °C
    #[serde(default = "default_base_temp")]
    pub base_temp: f64,

    /// Inclusive `[start, end]` hour ranges during which the room is occupied
    #[serde(default = "default_occupied_hours")]
    pub occupied_hours: Vec<[u32; 2]>,
}

fn default_rooms() -> Vec<RoomConfig> {
    vec![RoomConfig {
        name: "Living Room".to_string(),
        base_temp: default_base_temp(),
        occupied_hours: default_occupied_hours(),
    }]
}

fn default_hours() -> u32 {
    24
}

fn default_amplitude() -> f64 {
    5.0
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8565
}

fn default_base_temp() -> f64 {
    25.0
}

fn default_occupied_hours() -> Vec<[u32; 2]> {
    vec![[7, 9], [17, 23]]
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().to_path_buf(), e))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every constraint, reporting all problems together
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.simulation.hours == 0 || self.simulation.hours > MAX_HOURS {
            problems.push(format!(
                "simulation.hours must be between 1 and {}, got {}",
                MAX_HOURS, self.simulation.hours
            ));
        }

        if self.rooms.is_empty() {
            problems.push("at least one room must be configured".to_string());
        }

        let mut seen = HashMap::new();
        for (i, room) in self.rooms.iter().enumerate() {
            if room.name.trim().is_empty() {
                problems.push(format!("rooms[{}]: name must not be empty", i));
            } else if let Some(first) = seen.insert(room.name.as_str(), i) {
                problems.push(format!(
                    "rooms[{}]: duplicate room name '{}' (first defined at rooms[{}])",
                    i, room.name, first
                ));
            }

            for [start, end] in &room.occupied_hours {
                if *start > 23 || *end > 23 || start > end {
                    problems.push(format!(
                        "rooms[{}]: invalid occupied hours [{}, {}], expected 0 <= start <= end <= 23",
                        i, start, end
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.simulation.hours, 24);
        assert_eq!(config.simulation.tick_interval_ms, 0);
        assert!(!config.api.enabled);
        assert_eq!(config.api.port, 8565);
        assert_eq!(config.rooms.len(), 1);
        assert_eq!(config.rooms[0].name, "Living Room");
        assert_eq!(config.rooms[0].base_temp, 25.0);
        assert_eq!(config.rooms[0].occupied_hours, vec![[7, 9], [17, 23]]);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [logging]
            level = "debug"
            overrides = { "roomd::engine" = "trace" }

            [simulation]
            hours = 48
            tick_interval_ms = 250
            amplitude = 3.5

            [api]
            enabled = true
            listen = "0.0.0.0"
            port = 9000

            [[rooms]]
            name = "Kitchen"
            base_temp = 22.0
            occupied_hours = [[6, 8]]

            [[rooms]]
            name = "Study"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(
            config.logging.overrides.get("roomd::engine"),
            Some(&LogLevel::Trace)
        );
        assert_eq!(config.simulation.hours, 48);
        assert_eq!(config.simulation.amplitude, 3.5);
        assert!(config.api.enabled);
        assert_eq!(config.api.listen, "0.0.0.0");
        assert_eq!(config.rooms.len(), 2);
        assert_eq!(config.rooms[0].occupied_hours, vec![[6, 8]]);
        assert_eq!(config.rooms[1].base_temp, 25.0);
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let toml = r#"
            [simulation]
            hours = 0

            [[rooms]]
            name = "Kitchen"
            occupied_hours = [[9, 7]]

            [[rooms]]
            name = "Kitchen"

            [[rooms]]
            name = " "
        "#;

        let err = Config::from_toml(toml).unwrap_err();
        let ConfigError::Validation(problems) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(
            problems,
            &vec![
                "simulation.hours must be between 1 and 8760, got 0".to_string(),
                "rooms[0]: invalid occupied hours [9, 7], expected 0 <= start <= end <= 23"
                    .to_string(),
                "rooms[1]: duplicate room name 'Kitchen' (first defined at rooms[0])".to_string(),
                "rooms[2]: name must not be empty".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_room_list_is_invalid() {
        let err = Config::from_toml("rooms = []").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: at least one room must be configured"
        );
    }

    #[test]
    fn test_parse_error() {
        let err = Config::from_toml("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[rooms]]\nname = \"Garage\"\nbase_temp = 18.0").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.rooms[0].name, "Garage");
        assert_eq!(config.rooms[0].base_temp, 18.0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io(p, _) if p == path));
    }

    #[test]
    fn test_log_level_into_filter() {
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        let logging = LoggingConfig {
            level: LogLevel::Warn,
            overrides: HashMap::from([("roomd::engine".to_string(), LogLevel::Debug)]),
        };
        let filter = logging.filter();
        assert!(filter.would_enable("roomd::engine", &tracing::Level::DEBUG));
        assert!(!filter.would_enable("roomd::api", &tracing::Level::INFO));
    }
}
