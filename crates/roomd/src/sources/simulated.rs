use std::f64::consts::PI;

use async_trait::async_trait;

use crate::config::RoomConfig;
use crate::engine::PollResult;
use crate::engine::SensorSource;
use crate::engine::Target;
use crate::sensor::SensorReading;

/// Hour of the coldest point of the simulated day; the warmest is 12 hours later
const COLDEST_HOUR: f64 = 3.0;

const DAYLIGHT_START: u32 = 6;
const DAYLIGHT_END: u32 = 18;
const DAYLIGHT_MIN: f64 = 200.0;
const DAYLIGHT_PEAK: f64 = 1000.0;
const NIGHT_LIGHT_LEVEL: i64 = 50;

/// Deterministic temperature, presence and light sensors for one room.
#[derive(Debug, Clone)]
pub struct SimulatedRoom {
    name: String,
    base_temp: f64,
    amplitude: f64,
    occupied_hours: Vec<[u32; 2]>,
}

impl SimulatedRoom {
    pub fn new(room: &RoomConfig, amplitude: f64) -> Self {
        Self {
            name: room.name.clone(),
            base_temp: room.base_temp,
            amplitude,
            occupied_hours: room.occupied_hours.clone(),
        }
    }

    /// Temperature in °C, rounded to one decimal place
    pub fn temperature(&self, hour: u32) -> f64 {
        let phase = 2.0 * PI * (f64::from(hour % 24) - COLDEST_HOUR) / 24.0;
        let temp = self.base_temp - self.amplitude * phase.cos();
        (temp * 10.0).round() / 10.0
    }

    pub fn occupied(&self, hour: u32) -> bool {
        let hour = hour % 24;
        self.occupied_hours
            .iter()
            .any(|[start, end]| (*start..=*end).contains(&hour))
    }

    pub fn light_level(&self, hour: u32) -> i64 {
        let hour = hour % 24;
        if !(DAYLIGHT_START..=DAYLIGHT_END).contains(&hour) {
            return NIGHT_LIGHT_LEVEL;
        }
        let span = f64::from(DAYLIGHT_END - DAYLIGHT_START);
        let phase = PI * f64::from(hour - DAYLIGHT_START) / span;
        (DAYLIGHT_MIN + (DAYLIGHT_PEAK - DAYLIGHT_MIN) * phase.sin()).round() as i64
    }
}

#[async_trait]
impl SensorSource for SimulatedRoom {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self, hour: u32) -> PollResult {
        let target = Target::Room(self.name.clone());
        Ok(vec![
            (
                target.clone(),
                SensorReading::Temperature(self.temperature(hour)),
            ),
            (target.clone(), SensorReading::Occupancy(self.occupied(hour))),
            (target, SensorReading::LightLevel(self.light_level(hour))),
        ])
    }
}
