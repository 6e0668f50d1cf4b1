//! Extensions: the composable capability/state units attached to an entity.
//!
//! Each concrete extension owns a narrow slice of state and knows how to
//! serialize itself into an [`ExtensionRecord`]. Entities hold at most one
//! extension per [`ExtensionKind`]; callers discover capabilities at runtime
//! through typed lookups (`entity.ext::<Destructible>()`) rather than through
//! a type hierarchy on the entity itself.
//!
//! Behaviour that needs the rest of the world (update callbacks, interact
//! handlers, death handlers) is stored as boxed closures that receive the
//! [`EntityManager`](crate::manager::EntityManager) and the owning entity's
//! id when invoked. Extensions never hold references to their owner.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::ExtensionRecord;

pub mod behavior;
pub mod health;
pub mod items;
pub mod spatial;

pub use behavior::{Controllable, Group, Groupable, Input, UpdateFn, Updatable};
pub use health::{DeathHandler, Destructible, Ignitable};
pub use items::{Carryable, InteractFn, Interactive, Inventory, InventoryItem, ItemState};
pub use spatial::{Collidable, Movable, Positionable};

// ---------------------------------------------------------------------------
// ExtensionKind
// ---------------------------------------------------------------------------

/// Tag identifying a concrete extension type. Doubles as the slot index in an
/// entity's extension table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    Positionable,
    Movable,
    Collidable,
    Destructible,
    Carryable,
    Interactive,
    Updatable,
    Ignitable,
    Inventory,
    Groupable,
    Controllable,
}

impl ExtensionKind {
    /// Number of distinct extension kinds.
    pub const COUNT: usize = 11;

    pub const ALL: [ExtensionKind; Self::COUNT] = [
        ExtensionKind::Positionable,
        ExtensionKind::Movable,
        ExtensionKind::Collidable,
        ExtensionKind::Destructible,
        ExtensionKind::Carryable,
        ExtensionKind::Interactive,
        ExtensionKind::Updatable,
        ExtensionKind::Ignitable,
        ExtensionKind::Inventory,
        ExtensionKind::Groupable,
        ExtensionKind::Controllable,
    ];

    /// Slot index in an entity's extension table.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire tag, identical to the `kind` field of the serialized record.
    pub fn as_str(self) -> &'static str {
        match self {
            ExtensionKind::Positionable => "positionable",
            ExtensionKind::Movable => "movable",
            ExtensionKind::Collidable => "collidable",
            ExtensionKind::Destructible => "destructible",
            ExtensionKind::Carryable => "carryable",
            ExtensionKind::Interactive => "interactive",
            ExtensionKind::Updatable => "updatable",
            ExtensionKind::Ignitable => "ignitable",
            ExtensionKind::Inventory => "inventory",
            ExtensionKind::Groupable => "groupable",
            ExtensionKind::Controllable => "controllable",
        }
    }

    /// Whether the manager's tick pass drives this kind.
    pub fn runs_per_tick(self) -> bool {
        matches!(self, ExtensionKind::Updatable | ExtensionKind::Ignitable)
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Extension
// ---------------------------------------------------------------------------

/// A single extension instance. The variant is the capability; the payload
/// is its state.
#[derive(Debug)]
pub enum Extension {
    Positionable(Positionable),
    Movable(Movable),
    Collidable(Collidable),
    Destructible(Destructible),
    Carryable(Carryable),
    Interactive(Interactive),
    Updatable(Updatable),
    Ignitable(Ignitable),
    Inventory(Inventory),
    Groupable(Groupable),
    Controllable(Controllable),
}

impl Extension {
    pub fn kind(&self) -> ExtensionKind {
        match self {
            Extension::Positionable(_) => ExtensionKind::Positionable,
            Extension::Movable(_) => ExtensionKind::Movable,
            Extension::Collidable(_) => ExtensionKind::Collidable,
            Extension::Destructible(_) => ExtensionKind::Destructible,
            Extension::Carryable(_) => ExtensionKind::Carryable,
            Extension::Interactive(_) => ExtensionKind::Interactive,
            Extension::Updatable(_) => ExtensionKind::Updatable,
            Extension::Ignitable(_) => ExtensionKind::Ignitable,
            Extension::Inventory(_) => ExtensionKind::Inventory,
            Extension::Groupable(_) => ExtensionKind::Groupable,
            Extension::Controllable(_) => ExtensionKind::Controllable,
        }
    }

    /// Serialize into the `{ kind, ...fields }` wire record.
    pub fn serialize(&self) -> ExtensionRecord {
        match self {
            Extension::Positionable(e) => e.serialize(),
            Extension::Movable(e) => e.serialize(),
            Extension::Collidable(e) => e.serialize(),
            Extension::Destructible(e) => e.serialize(),
            Extension::Carryable(e) => e.serialize(),
            Extension::Interactive(e) => e.serialize(),
            Extension::Updatable(e) => e.serialize(),
            Extension::Ignitable(e) => e.serialize(),
            Extension::Inventory(e) => e.serialize(),
            Extension::Groupable(e) => e.serialize(),
            Extension::Controllable(e) => e.serialize(),
        }
    }
}

// ---------------------------------------------------------------------------
// ExtensionType -- typed access into the sum type
// ---------------------------------------------------------------------------

/// Implemented by every concrete extension so that entities can offer
/// `ext::<T>()` style lookups with compile-time checked return types.
pub trait ExtensionType: Into<Extension> + 'static {
    /// The tag this type is stored under.
    const KIND: ExtensionKind;

    fn downcast_ref(ext: &Extension) -> Option<&Self>;

    fn downcast_mut(ext: &mut Extension) -> Option<&mut Self>;

    fn take_from(ext: Extension) -> Option<Self>;
}

macro_rules! extension_types {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Extension {
                fn from(value: $variant) -> Self {
                    Extension::$variant(value)
                }
            }

            impl ExtensionType for $variant {
                const KIND: ExtensionKind = ExtensionKind::$variant;

                fn downcast_ref(ext: &Extension) -> Option<&Self> {
                    match ext {
                        Extension::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn downcast_mut(ext: &mut Extension) -> Option<&mut Self> {
                    match ext {
                        Extension::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn take_from(ext: Extension) -> Option<Self> {
                    match ext {
                        Extension::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

extension_types!(
    Positionable,
    Movable,
    Collidable,
    Destructible,
    Carryable,
    Interactive,
    Updatable,
    Ignitable,
    Inventory,
    Groupable,
    Controllable,
);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    #[test]
    fn kind_indices_are_dense_and_ordered() {
        for (i, kind) in ExtensionKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn kind_tag_matches_serde_name() {
        for kind in ExtensionKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::json!(kind.as_str()));
        }
    }

    #[test]
    fn downcast_matches_variant_only() {
        let ext: Extension = Movable::new().into();
        assert_eq!(ext.kind(), ExtensionKind::Movable);
        assert!(Movable::downcast_ref(&ext).is_some());
        assert!(Positionable::downcast_ref(&ext).is_none());
    }

    #[test]
    fn serialized_record_carries_kind_tag() {
        let ext: Extension = Positionable::new(Vec2::new(16.0, 16.0))
            .at(Vec2::new(3.0, 4.0))
            .into();
        let json = serde_json::to_value(ext.serialize()).unwrap();
        assert_eq!(json["kind"], "positionable");
        assert_eq!(json["position"]["x"], 3.0);
        assert_eq!(json["size"]["y"], 16.0);
    }
}
