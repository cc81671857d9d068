//! Messages delivered to the engine.
//!
//! Producers (sensor sources and the clock) only ever send; the engine is the
//! single consumer, so every room sees its updates and evaluations in order.

use crate::sensor::SensorReading;

/// Which rooms a reading is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single room, by name
    Room(String),
    /// Every registered room
    Broadcast,
}

/// A reading together with its destination.
pub type Addressed = (Target, SensorReading);

#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// A sensor reading to cache in the targeted rooms
    Reading {
        target: Target,
        reading: SensorReading,
    },

    /// Evaluate every room for the given hour
    Tick { hour: u32 },
}
