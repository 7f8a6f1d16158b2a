//! Characteristic state and event wiring.
//!
//! A characteristic holds a stored value, an optional synchronous read
//! handler, and a broadcast channel for pushing value updates to
//! subscribers. Read handlers shield event characteristics from ever
//! reporting a latched value: a read goes through the handler when one is
//! attached and only falls back to the stored value otherwise.

use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr};
use tokio::sync::broadcast;

/// Updates queued per characteristic before the oldest is dropped.
const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Well-known characteristic types.
///
/// Serialized names are the stable keys used when characteristic values are
/// persisted alongside their service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CharacteristicType {
    /// Edge-triggered press event (doorbell button)
    PressEvent,
    /// Live streaming status of a stream management service
    StreamingStatus,
    /// Whether a stream management service is active
    Active,
    /// Mute state of a microphone or speaker service
    Mute,
}

impl CharacteristicType {
    /// Event characteristics carry ephemeral values: they are pushed to
    /// subscribers but never persisted and never reported on reads.
    pub fn is_event(self) -> bool {
        matches!(self, CharacteristicType::PressEvent)
    }
}

/// Press kinds a press-event characteristic can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, Display, Serialize, Deserialize)]
#[repr(u8)]
pub enum PressKind {
    Single = 0,
    Double = 1,
    Long = 2,
}

impl PressKind {
    /// Decode a press kind from a characteristic value, if it carries one.
    pub fn from_value(value: &CharacteristicValue) -> Option<Self> {
        match value {
            CharacteristicValue::UInt8(raw) => Self::from_repr(*raw),
            _ => None,
        }
    }
}

impl From<PressKind> for CharacteristicValue {
    fn from(kind: PressKind) -> Self {
        CharacteristicValue::UInt8(kind as u8)
    }
}

/// Value carried by a characteristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacteristicValue {
    Bool(bool),
    UInt8(u8),
    UInt32(u32),
    Text(String),
}

type ReadHandler = Box<dyn Fn() -> Option<CharacteristicValue> + Send + Sync>;

/// A single characteristic of a service.
///
/// Reads are synchronous and non-blocking. `None` is a first-class read
/// result meaning "no value" (for a press-event characteristic: nothing is
/// currently pressed); it is not an error.
pub struct Characteristic {
    characteristic_type: CharacteristicType,
    value: RwLock<Option<CharacteristicValue>>,
    read_handler: RwLock<Option<ReadHandler>>,
    updates: broadcast::Sender<CharacteristicValue>,
}

impl Characteristic {
    pub fn new(characteristic_type: CharacteristicType) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            characteristic_type,
            value: RwLock::new(None),
            read_handler: RwLock::new(None),
            updates,
        }
    }

    pub fn characteristic_type(&self) -> CharacteristicType {
        self.characteristic_type
    }

    /// Read the current value.
    ///
    /// Goes through the attached read handler when one is set, otherwise
    /// returns the stored value.
    pub fn read(&self) -> Option<CharacteristicValue> {
        if let Some(handler) = self.read_handler.read().as_ref() {
            return handler();
        }
        self.value.read().clone()
    }

    /// Attach a synchronous read handler.
    ///
    /// The handler must not block; it is invoked inline while dispatching a
    /// single incoming query. Replaces any previously attached handler.
    pub fn on_read(&self, handler: impl Fn() -> Option<CharacteristicValue> + Send + Sync + 'static) {
        *self.read_handler.write() = Some(Box::new(handler));
    }

    /// Push an updated value, notifying every subscriber exactly once.
    ///
    /// Having no subscribers is not an error.
    pub fn update_value(&self, value: CharacteristicValue) {
        debug!(
            "Characteristic {} updated to {:?}",
            self.characteristic_type, value
        );
        *self.value.write() = Some(value.clone());
        let _ = self.updates.send(value);
    }

    /// Store a value without notifying subscribers.
    ///
    /// Used to seed initial values and to restore persisted ones.
    pub fn store_value(&self, value: CharacteristicValue) {
        *self.value.write() = Some(value);
    }

    /// The stored value, bypassing any read handler. This is what gets
    /// persisted for non-event characteristics.
    pub fn stored_value(&self) -> Option<CharacteristicValue> {
        self.value.read().clone()
    }

    /// Subscribe to value updates pushed via [`Characteristic::update_value`].
    pub fn subscribe(&self) -> broadcast::Receiver<CharacteristicValue> {
        self.updates.subscribe()
    }
}
