//! STN ECS -- composable entity runtime for the survival simulation.
//!
//! Game objects are [`Entity`](entity::Entity) values carrying at most one
//! [`Extension`](extension::Extension) per kind. Capabilities are discovered
//! at runtime with typed lookups, behaviour is wired in as closures, and the
//! [`EntityManager`](manager::EntityManager) owns the live set, answers
//! spatial queries and drives the per-tick pass with deferred removal.
//!
//! # Quick Start
//!
//! ```
//! use stn_ecs::prelude::*;
//!
//! let mut manager = EntityManager::new(EventLog::new(), 42);
//! let wall = manager.spawn(EntityType::Wall, |e| {
//!     e.with(Positionable::new(Vec2::new(16.0, 16.0)).at(Vec2::new(3.0, 4.0)))
//!         .with(Destructible::new(10))
//! });
//!
//! manager.damage(wall, 3);
//! let entity = manager.entity(wall).unwrap();
//! assert_eq!(entity.ext::<Destructible>().unwrap().health(), 7);
//!
//! let record = entity.serialize();
//! assert_eq!(record.entity_type, EntityType::Wall);
//! assert_eq!(record.extensions.len(), 2);
//! ```

#![deny(unsafe_code)]

pub mod cooldown;
pub mod entity;
pub mod event;
pub mod extension;
pub mod geometry;
pub mod manager;
pub mod pickup;
pub mod removal;
pub mod snapshot;

use entity::EntityId;
use extension::ExtensionKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by entity and extension operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// A capability the caller treated as guaranteed is missing. This points
    /// at an assembly wiring bug.
    #[error("entity {entity} has no '{kind}' extension")]
    ExtensionNotFound {
        entity: EntityId,
        kind: ExtensionKind,
    },

    /// The entity was removed or never existed.
    #[error("entity {entity} does not exist (removed or never allocated)")]
    EntityNotFound { entity: EntityId },

    /// An extension of this kind is already attached.
    #[error("entity {entity} already has a '{kind}' extension")]
    DuplicateExtension {
        entity: EntityId,
        kind: ExtensionKind,
    },

    /// A wire id that is not a decimal integer.
    #[error("invalid entity id '{raw}'")]
    InvalidEntityId { raw: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::cooldown::Cooldown;
    pub use crate::entity::{Entity, EntityId, EntityType, UnknownEntityType};
    pub use crate::event::{Broadcaster, EventLog, EventType, GameEvent, TracingBroadcaster};
    pub use crate::extension::{
        Carryable, Collidable, Controllable, Destructible, Extension, ExtensionKind,
        ExtensionType, Group, Groupable, Ignitable, Input, Interactive, Inventory,
        InventoryItem, ItemState, Movable, Positionable, Updatable,
    };
    pub use crate::geometry::{distance, Direction, Rect, Vec2};
    pub use crate::manager::EntityManager;
    pub use crate::pickup::{pickup, sum_counts, MergeFn, PickupOptions};
    pub use crate::removal::FlushReport;
    pub use crate::snapshot::{EntityRecord, ExtensionRecord, WorldSnapshot};
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
