//! Typed domain events and the [`Broadcaster`] seam.
//!
//! The simulation announces what happened (a zombie was hurt, an item was
//! picked up) through a [`Broadcaster`] handed to the manager at
//! construction. Delivery is somebody else's problem: a network layer, a
//! test capture ([`EventLog`]) or plain logging ([`TracingBroadcaster`]).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

/// Wire tag of a [`GameEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ZombieHurt,
    ZombieDeath,
    PlayerHurt,
    PlayerDeath,
    PlayerPickedUpItem,
    PlayerDroppedItem,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::ZombieHurt => "zombie_hurt",
            EventType::ZombieDeath => "zombie_death",
            EventType::PlayerHurt => "player_hurt",
            EventType::PlayerDeath => "player_death",
            EventType::PlayerPickedUpItem => "player_picked_up_item",
            EventType::PlayerDroppedItem => "player_dropped_item",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// A server-sent event.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ZombieHurt { zombie_id: EntityId },
    ZombieDeath { zombie_id: EntityId },
    PlayerHurt { player_id: EntityId },
    PlayerDeath { player_id: EntityId },
    PlayerPickedUpItem { player_id: EntityId, item_type: String },
    PlayerDroppedItem { player_id: EntityId, item_type: String },
}

impl GameEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            GameEvent::ZombieHurt { .. } => EventType::ZombieHurt,
            GameEvent::ZombieDeath { .. } => EventType::ZombieDeath,
            GameEvent::PlayerHurt { .. } => EventType::PlayerHurt,
            GameEvent::PlayerDeath { .. } => EventType::PlayerDeath,
            GameEvent::PlayerPickedUpItem { .. } => EventType::PlayerPickedUpItem,
            GameEvent::PlayerDroppedItem { .. } => EventType::PlayerDroppedItem,
        }
    }

    /// Event payload. Single-entity events carry just the id string;
    /// item events carry `{ playerId, itemType }`.
    pub fn serialize(&self) -> Value {
        match self {
            GameEvent::ZombieHurt { zombie_id } | GameEvent::ZombieDeath { zombie_id } => {
                json!(zombie_id.to_string())
            }
            GameEvent::PlayerHurt { player_id } | GameEvent::PlayerDeath { player_id } => {
                json!(player_id.to_string())
            }
            GameEvent::PlayerPickedUpItem {
                player_id,
                item_type,
            }
            | GameEvent::PlayerDroppedItem {
                player_id,
                item_type,
            } => json!({
                "playerId": player_id.to_string(),
                "itemType": item_type,
            }),
        }
    }

    /// `{ type, payload }` envelope for transports that multiplex events.
    pub fn to_message(&self) -> Value {
        json!({
            "type": self.event_type().as_str(),
            "payload": self.serialize(),
        })
    }
}

// ---------------------------------------------------------------------------
// Broadcaster
// ---------------------------------------------------------------------------

/// Send side of the event channel.
pub trait Broadcaster {
    fn broadcast_event(&mut self, event: GameEvent);
}

/// Capturing broadcaster. Clones share the same log, so a test can keep one
/// handle and give the other to the manager.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything captured so far.
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    /// Take everything captured so far.
    pub fn drain(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Number of captured events of `event_type`.
    pub fn count(&self, event_type: EventType) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }
}

impl Broadcaster for EventLog {
    fn broadcast_event(&mut self, event: GameEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// Logs every event at `info` and drops it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBroadcaster;

impl Broadcaster for TracingBroadcaster {
    fn broadcast_event(&mut self, event: GameEvent) {
        info!(
            event_type = %event.event_type(),
            payload = %event.serialize(),
            "game event"
        );
    }
}
