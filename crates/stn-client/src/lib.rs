//! STN Client -- display-side reconstruction of the simulation.
//!
//! The server sends the bare entity list every tick. This crate turns each
//! flat record back into a typed mirror that holds only what a renderer
//! needs (position, health, inventory, input). It never rebuilds the
//! extension objects themselves.
//!
//! A bad record costs only that record: [`EntityFactory::reconstruct`]
//! collects the failures next to the mirrors it could build.
//!
//! ```
//! use serde_json::json;
//! use stn_client::prelude::*;
//!
//! let payload = json!([
//!     { "id": "1", "type": "fire", "extensions": [
//!         { "kind": "positionable", "position": { "x": 4.0, "y": 2.0 },
//!           "size": { "x": 16.0, "y": 16.0 } }
//!     ] },
//!     { "id": "2", "type": "tree", "extensions": [] }
//! ]);
//!
//! let result = EntityFactory::new().reconstruct(&payload);
//! assert_eq!(result.entities.len(), 1);
//! assert_eq!(
//!     result.errors,
//!     vec![ReconstructError::UnknownEntityType { type_tag: "tree".into() }]
//! );
//! ```
//!
//! [`EntityFactory::reconstruct`]: factory::EntityFactory::reconstruct

#![deny(unsafe_code)]

pub mod factory;
pub mod mirror;
pub mod record;
pub mod state;

// ---------------------------------------------------------------------------
// ReconstructError
// ---------------------------------------------------------------------------

/// Why a single wire record could not be turned into a mirror.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconstructError {
    /// The record has no `type` string.
    #[error("invalid entity data, no type tag: {record}")]
    MissingEntityType { record: String },

    /// The `type` tag names no known entity type.
    #[error("unknown entity type: {type_tag}")]
    UnknownEntityType { type_tag: String },

    /// The record is structurally wrong: bad id, missing required extension,
    /// or a field of the wrong shape.
    #[error("malformed entity record: {details}")]
    MalformedRecord { details: String },
}

impl ReconstructError {
    pub(crate) fn malformed(details: impl Into<String>) -> Self {
        ReconstructError::MalformedRecord {
            details: details.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common client usage.
pub mod prelude {
    pub use crate::factory::{EntityFactory, Reconstruction};
    pub use crate::mirror::{
        BulletMirror, ClientEntity, FireMirror, ItemMirror, PlayerMirror, WallMirror,
        ZombieMirror,
    };
    pub use crate::record::RecordView;
    pub use crate::state::ClientState;
    pub use crate::ReconstructError;
    pub use stn_ecs::prelude::{EntityId, EntityType, Input, InventoryItem, ItemState, Vec2};
}
