use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use strum::EnumString;

/// Light level strictly below which an occupied room is considered dark.
pub const DARK_THRESHOLD: i64 = 300;

/// State of a room's lighting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LightState {
    #[default]
    Off,
    On,
}

impl LightState {
    /// Lights are on only when the room is occupied and dark.
    pub fn evaluate(occupied: bool, light_level: i64) -> LightState {
        if occupied && light_level < DARK_THRESHOLD {
            LightState::On
        } else {
            LightState::Off
        }
    }
}

/// Lighting state machine. Carries no memory between updates.
#[derive(Debug, Clone, Default)]
pub struct LightController {
    state: LightState,
}

impl LightController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    pub fn update_state(&mut self, occupied: bool, light_level: i64) -> LightState {
        self.state = LightState::evaluate(occupied, light_level);
        self.state
    }
}
