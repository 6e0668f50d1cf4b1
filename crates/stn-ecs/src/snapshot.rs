//! Wire records: the flattened form of entities sent to clients.
//!
//! An entity serializes to an [`EntityRecord`] `{ id, type, extensions }`,
//! where each extension is an [`ExtensionRecord`] `{ kind, ...fields }`. The
//! manager serializes the full live set once per tick into a
//! [`WorldSnapshot`], which carries a BLAKE3 content hash so that both sides
//! of the wire can check they agree on the same state.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityType};
use crate::extension::{ExtensionKind, Group, Input, InventoryItem, ItemState};
use crate::geometry::Vec2;

// ---------------------------------------------------------------------------
// ExtensionRecord
// ---------------------------------------------------------------------------

/// Serialized form of one extension. The `kind` tag matches
/// [`ExtensionKind::as_str`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtensionRecord {
    Positionable {
        position: Vec2,
        size: Vec2,
    },
    Movable {
        velocity: Vec2,
    },
    Collidable {
        offset: Vec2,
        size: Vec2,
    },
    #[serde(rename_all = "camelCase")]
    Destructible {
        health: u32,
        max_health: u32,
    },
    #[serde(rename_all = "camelCase")]
    Carryable {
        item_type: String,
        #[serde(default)]
        state: ItemState,
    },
    #[serde(rename_all = "camelCase")]
    Interactive {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
    },
    Updatable,
    #[serde(rename_all = "camelCase")]
    Ignitable {
        total_damage: u32,
        max_damage: u32,
    },
    Inventory {
        items: Vec<InventoryItem>,
        capacity: usize,
    },
    Groupable {
        group: Group,
    },
    Controllable {
        input: Input,
    },
}

impl ExtensionRecord {
    pub fn kind(&self) -> ExtensionKind {
        match self {
            ExtensionRecord::Positionable { .. } => ExtensionKind::Positionable,
            ExtensionRecord::Movable { .. } => ExtensionKind::Movable,
            ExtensionRecord::Collidable { .. } => ExtensionKind::Collidable,
            ExtensionRecord::Destructible { .. } => ExtensionKind::Destructible,
            ExtensionRecord::Carryable { .. } => ExtensionKind::Carryable,
            ExtensionRecord::Interactive { .. } => ExtensionKind::Interactive,
            ExtensionRecord::Updatable => ExtensionKind::Updatable,
            ExtensionRecord::Ignitable { .. } => ExtensionKind::Ignitable,
            ExtensionRecord::Inventory { .. } => ExtensionKind::Inventory,
            ExtensionRecord::Groupable { .. } => ExtensionKind::Groupable,
            ExtensionRecord::Controllable { .. } => ExtensionKind::Controllable,
        }
    }
}

// ---------------------------------------------------------------------------
// EntityRecord
// ---------------------------------------------------------------------------

/// Serialized form of one entity. Extensions appear in attach order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub extensions: Vec<ExtensionRecord>,
}

impl EntityRecord {
    /// The record for `kind`, if the entity carried one.
    pub fn extension(&self, kind: ExtensionKind) -> Option<&ExtensionRecord> {
        self.extensions.iter().find(|ext| ext.kind() == kind)
    }
}

// ---------------------------------------------------------------------------
// WorldSnapshot
// ---------------------------------------------------------------------------

/// All live entities at the end of a tick, with a content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick that produced this snapshot.
    pub tick: u64,
    /// Live entities in id order.
    pub entities: Vec<EntityRecord>,
    /// BLAKE3 hex digest of the serialized entity list.
    pub hash: String,
}

impl WorldSnapshot {
    pub fn new(tick: u64, entities: Vec<EntityRecord>) -> Self {
        let hash = compute_hash(&entities);
        Self {
            tick,
            entities,
            hash,
        }
    }

    /// Whether `hash` still matches the entity list.
    pub fn is_consistent(&self) -> bool {
        compute_hash(&self.entities) == self.hash
    }

    /// The wire payload: the bare entity list as JSON.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.entities)
            .expect("entity records should always be JSON-serializable")
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// BLAKE3 hex digest over the JSON encoding of `entities`.
pub fn compute_hash(entities: &[EntityRecord]) -> String {
    let json_bytes = serde_json::to_vec(entities)
        .expect("entity records should always be JSON-serializable");
    blake3::hash(&json_bytes).to_hex().to_string()
}
