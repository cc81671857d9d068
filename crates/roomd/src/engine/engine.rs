use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::message::EngineMessage;
use super::message::Target;
use super::report::ReportSink;
use super::state::State;
use crate::control::RoomController;
use crate::sensor::SensorHub;
use crate::sensor::SensorObserver;

/// Sending half of the channel into the engine
pub type EngineSender = mpsc::Sender<EngineMessage>;

/// Capacity for the producer→engine message channel
/// Provides backpressure when sources send faster than the engine can process
const ENGINE_CHANNEL_SIZE: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Room '{0}' is already registered")]
    DuplicateRoom(String),
}

/// roomd engine
///
/// Owns every room controller. Readings and ticks arrive over a single
/// channel and are handled one at a time, so no room is ever touched by two
/// callers at once.
pub struct Engine<S> {
    rooms: Rooms<S>,

    message_rx: mpsc::Receiver<EngineMessage>,

    /// Kept so `sender()` can hand out clones; dropped when `run` starts
    message_tx: EngineSender,
}

/// Everything the event loop mutates.
struct Rooms<S> {
    /// Rooms in registration order
    hub: SensorHub<RoomController>,

    /// Map of room name -> index into `hub` for routing readings
    index: HashMap<String, usize>,

    /// Where reports go after each evaluation
    sink: S,

    /// Latest state snapshot, readable by anyone holding a receiver
    state_tx: watch::Sender<Arc<State>>,
}

impl<S: ReportSink> Engine<S> {
    /// Create a new Engine reporting to `sink`
    pub fn new(sink: S) -> Self {
        let (message_tx, message_rx) = mpsc::channel(ENGINE_CHANNEL_SIZE);
        let (state_tx, _) = watch::channel(Arc::default());
        Self {
            rooms: Rooms {
                hub: SensorHub::new(),
                index: HashMap::new(),
                sink,
                state_tx,
            },
            message_rx,
            message_tx,
        }
    }

    /// Register a room with the engine
    pub fn add_room(&mut self, room: RoomController) -> Result<(), EngineError> {
        if self.rooms.index.contains_key(room.name()) {
            return Err(EngineError::DuplicateRoom(room.name().to_string()));
        }

        info!("Registered room: {}", room.name());
        let name = room.name().to_string();
        let index = self.rooms.hub.subscribe(room);
        self.rooms.index.insert(name, index);
        Ok(())
    }

    pub fn room(&self, name: &str) -> Option<&RoomController> {
        self.rooms
            .index
            .get(name)
            .and_then(|&index| self.rooms.hub.get(index))
    }

    /// Get a sender for delivering messages to this engine
    pub fn sender(&self) -> EngineSender {
        self.message_tx.clone()
    }

    /// Get a receiver that always holds the latest state snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<State>> {
        self.rooms.state_tx.subscribe()
    }

    /// Get a snapshot of the current engine state.
    ///
    /// Clones the `Arc` (atomic refcount bump), essentially free.
    pub fn state_snapshot(&self) -> Arc<State> {
        self.rooms.state_tx.borrow().clone()
    }

    pub fn sink(&self) -> &S {
        &self.rooms.sink
    }

    /// Handle a single message without going through the channel
    pub fn handle_message(&mut self, msg: EngineMessage) {
        self.rooms.handle_message(msg);
    }

    /// Run the engine's main event loop
    ///
    /// Returns the sink once every sender has been dropped.
    pub async fn run(self) -> S {
        let Self {
            mut rooms,
            mut message_rx,
            message_tx,
        } = self;
        drop(message_tx);

        if rooms.hub.is_empty() {
            warn!("Engine starting with no rooms; readings will be dropped");
        } else {
            info!("Engine starting with {} room(s)", rooms.hub.len());
        }

        while let Some(msg) = message_rx.recv().await {
            rooms.handle_message(msg);
        }

        info!("Engine shutting down");
        rooms.sink
    }
}

impl<S: ReportSink> Rooms<S> {
    fn handle_message(&mut self, msg: EngineMessage) {
        match msg {
            EngineMessage::Reading {
                target: Target::Room(name),
                reading,
            } => match self.index.get(&name).and_then(|&i| self.hub.get_mut(i)) {
                Some(room) => {
                    debug!("[{}] Reading: {:?}", name, reading);
                    room.receive(&reading);
                }
                None => warn!("Dropping reading for unknown room '{}': {:?}", name, reading),
            },
            EngineMessage::Reading {
                target: Target::Broadcast,
                reading,
            } => {
                debug!("Broadcasting reading to all rooms: {:?}", reading);
                self.hub.publish(&reading);
            }
            EngineMessage::Tick { hour } => self.evaluate(hour),
        }
    }

    /// Evaluate every room, report the results and publish a new snapshot
    fn evaluate(&mut self, hour: u32) {
        let mut state = State {
            hour: Some(hour),
            rooms: Default::default(),
        };

        for room in self.hub.iter_mut() {
            let report = room.evaluate();
            self.sink.report(hour, &report);
            state.rooms.insert(report.room.clone(), report);
        }

        self.state_tx.send_replace(Arc::new(state));
    }
}
