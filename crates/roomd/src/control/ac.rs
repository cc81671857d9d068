use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use strum::EnumString;

/// Temperature at or above which an occupied room starts cooling.
pub const COOLING_ON_CELSIUS: f64 = 28.0;

/// Temperature strictly below which a cooling room falls back to standby.
pub const COOLING_OFF_CELSIUS: f64 = 24.0;

/// State of a room's air conditioning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AcState {
    /// Room is empty.
    #[default]
    Off,
    /// Room is occupied but warm enough that no cooling is needed.
    Standby,
    /// Room is occupied and cooling.
    Cooling,
}

impl AcState {
    /// Compute the state that follows `self` for the given inputs.
    ///
    /// Losing occupancy always resets to `Off`. Once cooling, the unit keeps
    /// cooling until the temperature drops below [`COOLING_OFF_CELSIUS`], which
    /// keeps it from toggling around [`COOLING_ON_CELSIUS`].
    pub fn next(self, occupied: bool, temp: f64) -> AcState {
        if !occupied {
            return AcState::Off;
        }

        match self {
            AcState::Off | AcState::Standby if temp >= COOLING_ON_CELSIUS => AcState::Cooling,
            AcState::Off | AcState::Standby => AcState::Standby,
            AcState::Cooling if temp < COOLING_OFF_CELSIUS => AcState::Standby,
            AcState::Cooling => AcState::Cooling,
        }
    }
}

/// Air conditioning state machine.
#[derive(Debug, Clone, Default)]
pub struct AcController {
    state: AcState,
}

impl AcController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AcState {
        self.state
    }

    /// Advance the state machine and return the new state.
    pub fn update_state(&mut self, occupied: bool, temp: f64) -> AcState {
        self.state = self.state.next(occupied, temp);
        self.state
    }
}
