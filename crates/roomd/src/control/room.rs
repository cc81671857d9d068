use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ac::AcController;
use super::ac::AcState;
use super::light::LightController;
use super::light::LightState;
use crate::sensor::SensorObserver;
use crate::sensor::SensorReading;

pub const DEFAULT_TEMPERATURE: f64 = 20.0;
pub const DEFAULT_LIGHT_LEVEL: i64 = 500;

/// Outcome of evaluating a room: the cached sensor values and the actuator
/// states derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub room: String,
    pub temperature: f64,
    pub occupied: bool,
    pub light_level: i64,
    pub ac: AcState,
    pub lights: LightState,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Temp: {:.1}°C | Occ: {} | Lvl: {} | AC: {} | Lights: {}",
            self.room, self.temperature, self.occupied, self.light_level, self.ac, self.lights
        )
    }
}

/// Controller for a single room.
///
/// Keeps the latest value of each sensor kind and drives the AC and light
/// state machines from them when evaluated. Updating a value never evaluates
/// on its own; evaluation is scheduled by the caller.
#[derive(Debug, Clone)]
pub struct RoomController {
    name: String,
    ac: AcController,
    lights: LightController,

    current_temp: f64,
    is_occupied: bool,
    current_light_level: i64,

    /// Manual overrides. Stored only; evaluation does not consult them yet.
    manual_ac_override: Option<AcState>,
    manual_light_override: Option<LightState>,
}

impl RoomController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ac: AcController::new(),
            lights: LightController::new(),
            current_temp: DEFAULT_TEMPERATURE,
            is_occupied: false,
            current_light_level: DEFAULT_LIGHT_LEVEL,
            manual_ac_override: None,
            manual_light_override: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_temp(&self) -> f64 {
        self.current_temp
    }

    pub fn is_occupied(&self) -> bool {
        self.is_occupied
    }

    pub fn current_light_level(&self) -> i64 {
        self.current_light_level
    }

    pub fn ac_state(&self) -> AcState {
        self.ac.state()
    }

    pub fn light_state(&self) -> LightState {
        self.lights.state()
    }

    pub fn ac_override(&self) -> Option<AcState> {
        self.manual_ac_override
    }

    pub fn set_ac_override(&mut self, state: Option<AcState>) {
        self.manual_ac_override = state;
    }

    pub fn light_override(&self) -> Option<LightState> {
        self.manual_light_override
    }

    pub fn set_light_override(&mut self, state: Option<LightState>) {
        self.manual_light_override = state;
    }

    /// Overwrite the cached value matching the reading's kind.
    pub fn update(&mut self, reading: &SensorReading) {
        match reading {
            SensorReading::Temperature(t) => self.current_temp = *t,
            SensorReading::Occupancy(o) => self.is_occupied = *o,
            SensorReading::LightLevel(l) => self.current_light_level = *l,
            SensorReading::Unknown(tag) => {
                debug!("[{}] Ignoring reading with unknown tag {:?}", self.name, tag);
            }
        }
    }

    /// Drive both state machines from the cached values.
    pub fn evaluate(&mut self) -> Report {
        let ac = self.ac.update_state(self.is_occupied, self.current_temp);
        let lights = self
            .lights
            .update_state(self.is_occupied, self.current_light_level);

        Report {
            room: self.name.clone(),
            temperature: self.current_temp,
            occupied: self.is_occupied,
            light_level: self.current_light_level,
            ac,
            lights,
        }
    }
}

impl SensorObserver for RoomController {
    fn receive(&mut self, reading: &SensorReading) {
        self.update(reading);
    }
}
