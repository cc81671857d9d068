//! Sensor readings and the observer capability that consumes them.
//!
//! Sources speak the dictionary shape used by the sensor layer, for example
//! `{"sensor_type": "pir", "occupied": true}`. That shape is parsed into a
//! [`RawReading`] and converted into a typed [`SensorReading`] before any room
//! sees it. Unrecognized tags survive conversion as [`SensorReading::Unknown`]
//! so that new sensor kinds can be introduced without breaking older rooms.

use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use strum::EnumString;

/// Kinds of sensor the controller understands, named by their wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Pir,
    Ldr,
}

impl SensorKind {
    /// Name of the field carrying this kind's value.
    pub fn field(self) -> &'static str {
        match self {
            SensorKind::Temperature | SensorKind::Ldr => "value",
            SensorKind::Pir => "occupied",
        }
    }
}

/// A single typed reading from one sensor.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorReading {
    /// Temperature in degrees Celsius
    Temperature(f64),
    /// Whether the room is occupied
    Occupancy(bool),
    /// Ambient light level
    LightLevel(i64),
    /// A reading with a tag this controller does not know (or no tag at all)
    Unknown(Option<String>),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadingError {
    #[error("invalid {sensor_type} reading: missing or malformed field '{field}'")]
    InvalidReading {
        sensor_type: SensorKind,
        field: &'static str,
    },
}

/// Untyped reading as delivered by a sensor source.
///
/// Field values stay untyped until conversion so that a malformed field on a
/// known tag becomes [`ReadingError::InvalidReading`], and fields of unknown
/// tags are never inspected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupied: Option<serde_json::Value>,
}

impl TryFrom<RawReading> for SensorReading {
    type Error = ReadingError;

    fn try_from(raw: RawReading) -> Result<Self, Self::Error> {
        let parsed = raw.sensor_type.as_deref().map(str::parse::<SensorKind>);
        let kind = match parsed {
            Some(Ok(kind)) => kind,
            Some(Err(_)) | None => return Ok(SensorReading::Unknown(raw.sensor_type)),
        };

        let invalid = || ReadingError::InvalidReading {
            sensor_type: kind,
            field: kind.field(),
        };

        match kind {
            SensorKind::Temperature => raw
                .value
                .as_ref()
                .and_then(serde_json::Value::as_f64)
                .map(SensorReading::Temperature)
                .ok_or_else(invalid),
            SensorKind::Pir => raw
                .occupied
                .as_ref()
                .and_then(serde_json::Value::as_bool)
                .map(SensorReading::Occupancy)
                .ok_or_else(invalid),
            SensorKind::Ldr => raw
                .value
                .as_ref()
                .and_then(serde_json::Value::as_i64)
                .map(SensorReading::LightLevel)
                .ok_or_else(invalid),
        }
    }
}

/// Anything that can be handed sensor readings.
///
/// Delivery is up to the caller: readings may come from a direct call, a
/// channel, or a simulated clock.
pub trait SensorObserver {
    fn receive(&mut self, reading: &SensorReading);
}

/// Fans each published reading out to every subscribed observer.
#[derive(Debug)]
pub struct SensorHub<O> {
    observers: Vec<O>,
}

impl<O: SensorObserver> SensorHub<O> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer, returning its index in the hub.
    pub fn subscribe(&mut self, observer: O) -> usize {
        self.observers.push(observer);
        self.observers.len() - 1
    }

    pub fn publish(&mut self, reading: &SensorReading) {
        for observer in &mut self.observers {
            observer.receive(reading);
        }
    }

    pub fn get(&self, index: usize) -> Option<&O> {
        self.observers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut O> {
        self.observers.get_mut(index)
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, O> {
        self.observers.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<O: SensorObserver> Default for SensorHub<O> {
    fn default() -> Self {
        Self::new()
    }
}
