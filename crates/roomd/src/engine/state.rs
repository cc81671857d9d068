use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::control::Report;

/// Snapshot of the latest evaluation of every room.
///
/// Published by the engine after each tick; readers never block the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Hour of the most recent tick, if any tick has happened
    pub hour: Option<u32>,

    pub rooms: BTreeMap<String, Report>,
}
