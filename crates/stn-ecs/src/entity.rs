//! Entity identity and extension composition.
//!
//! An [`Entity`] is an [`EntityId`], an immutable [`EntityType`] tag, and at
//! most one [`Extension`] per [`ExtensionKind`]. Extensions live in a fixed
//! slot table indexed by kind (O(1) lookup) while a separate list remembers
//! attach order, which is the order they serialize in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::extension::{
    Collidable, Destructible, Extension, ExtensionKind, ExtensionType, Group, Groupable,
    Positionable,
};
use crate::geometry::{Rect, Vec2};
use crate::snapshot::EntityRecord;
use crate::EcsError;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// Opaque entity identifier assigned by the [`EntityManager`](crate::manager::EntityManager).
///
/// Ids are handed out in increasing order and never reused, so a lookup with
/// the id of a removed entity reports "not found" instead of reaching a
/// different entity. On the wire an id is a decimal string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EntityId(u64);

impl EntityId {
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = EcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(EntityId)
            .map_err(|_| EcsError::InvalidEntityId { raw: s.to_owned() })
    }
}

impl TryFrom<String> for EntityId {
    type Error = EcsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Which assembly produced an entity. Immutable for the entity's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Player,
    Zombie,
    Bullet,
    Wall,
    PistolAmmo,
    ShotgunAmmo,
    Bandage,
    Fire,
}

impl EntityType {
    pub const ALL: [EntityType; 8] = [
        EntityType::Player,
        EntityType::Zombie,
        EntityType::Bullet,
        EntityType::Wall,
        EntityType::PistolAmmo,
        EntityType::ShotgunAmmo,
        EntityType::Bandage,
        EntityType::Fire,
    ];

    /// Wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Player => "player",
            EntityType::Zombie => "zombie",
            EntityType::Bullet => "bullet",
            EntityType::Wall => "wall",
            EntityType::PistolAmmo => "pistol_ammo",
            EntityType::ShotgunAmmo => "shotgun_ammo",
            EntityType::Bandage => "bandage",
            EntityType::Fire => "fire",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type tag that names no known [`EntityType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type '{0}'")]
pub struct UnknownEntityType(pub String);

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownEntityType(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An identity plus its extensions.
pub struct Entity {
    id: EntityId,
    entity_type: EntityType,
    slots: [Option<Extension>; ExtensionKind::COUNT],
    order: Vec<ExtensionKind>,
}

impl Entity {
    /// An entity with no extensions. Normally built through
    /// [`EntityManager::spawn`](crate::manager::EntityManager::spawn), which
    /// assigns the id.
    pub fn new(id: EntityId, entity_type: EntityType) -> Self {
        Self {
            id,
            entity_type,
            slots: std::array::from_fn(|_| None),
            order: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Builder-style attach.
    ///
    /// # Panics
    ///
    /// Panics if an extension of the same kind is already attached. Assembly
    /// functions attach a fixed set, so a duplicate is a wiring bug.
    pub fn with(mut self, ext: impl Into<Extension>) -> Self {
        let ext = ext.into();
        let kind = ext.kind();
        assert!(
            self.slots[kind.index()].is_none(),
            "duplicate extension kind {kind} on entity {}",
            self.id
        );
        self.insert(ext);
        self
    }

    /// Attach an extension. Fails if one of the same kind is already present.
    pub fn add_extension(&mut self, ext: impl Into<Extension>) -> Result<(), EcsError> {
        let ext = ext.into();
        let kind = ext.kind();
        if self.slots[kind.index()].is_some() {
            return Err(EcsError::DuplicateExtension {
                entity: self.id,
                kind,
            });
        }
        self.insert(ext);
        Ok(())
    }

    fn insert(&mut self, ext: Extension) {
        let kind = ext.kind();
        self.slots[kind.index()] = Some(ext);
        self.order.push(kind);
    }

    /// Detach the extension of `kind`, returning it.
    pub fn remove_extension(&mut self, kind: ExtensionKind) -> Option<Extension> {
        let ext = self.slots[kind.index()].take()?;
        self.order.retain(|k| *k != kind);
        Some(ext)
    }

    /// Typed variant of [`remove_extension`](Self::remove_extension).
    pub fn remove<T: ExtensionType>(&mut self) -> Option<T> {
        T::take_from(self.remove_extension(T::KIND)?)
    }

    /// Extensions in attach order.
    pub fn extensions(&self) -> impl Iterator<Item = &Extension> + '_ {
        self.order
            .iter()
            .filter_map(move |kind| self.slots[kind.index()].as_ref())
    }

    /// Kinds in attach order.
    pub fn extension_kinds(&self) -> &[ExtensionKind] {
        &self.order
    }

    pub fn has(&self, kind: ExtensionKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    pub fn has_ext<T: ExtensionType>(&self) -> bool {
        self.has(T::KIND)
    }

    /// Typed lookup. Fails with [`EcsError::ExtensionNotFound`] when absent.
    pub fn ext<T: ExtensionType>(&self) -> Result<&T, EcsError> {
        self.try_ext::<T>().ok_or(EcsError::ExtensionNotFound {
            entity: self.id,
            kind: T::KIND,
        })
    }

    pub fn ext_mut<T: ExtensionType>(&mut self) -> Result<&mut T, EcsError> {
        let id = self.id;
        self.try_ext_mut::<T>().ok_or(EcsError::ExtensionNotFound {
            entity: id,
            kind: T::KIND,
        })
    }

    /// Optional lookup for callers that treat the capability as optional.
    pub fn try_ext<T: ExtensionType>(&self) -> Option<&T> {
        self.slots[T::KIND.index()].as_ref().and_then(T::downcast_ref)
    }

    pub fn try_ext_mut<T: ExtensionType>(&mut self) -> Option<&mut T> {
        self.slots[T::KIND.index()]
            .as_mut()
            .and_then(T::downcast_mut)
    }

    // -- derived spatial accessors ------------------------------------------

    pub fn position(&self) -> Option<Vec2> {
        self.try_ext::<Positionable>().map(Positionable::position)
    }

    pub fn center_position(&self) -> Option<Vec2> {
        self.try_ext::<Positionable>()
            .map(Positionable::center_position)
    }

    /// Collision hitbox: the [`Collidable`] footprint at the entity's position.
    pub fn hitbox(&self) -> Option<Rect> {
        let pos = self.try_ext::<Positionable>()?;
        let collidable = self.try_ext::<Collidable>()?;
        Some(collidable.hitbox(pos.position()))
    }

    /// Area that can be hit: the full positionable footprint, independent
    /// of any collision offset.
    pub fn damage_box(&self) -> Option<Rect> {
        self.try_ext::<Positionable>().map(Positionable::bounds)
    }

    /// Destructible and at zero health.
    pub fn is_dead(&self) -> bool {
        self.try_ext::<Destructible>()
            .is_some_and(Destructible::is_dead)
    }

    pub fn group(&self) -> Option<Group> {
        self.try_ext::<Groupable>().map(Groupable::group)
    }

    pub fn serialize(&self) -> EntityRecord {
        EntityRecord {
            id: self.id,
            entity_type: self.entity_type,
            extensions: self.extensions().map(Extension::serialize).collect(),
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("entity_type", &self.entity_type)
            .field("extensions", &self.order)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{Movable, Updatable};

    fn wall() -> Entity {
        Entity::new(EntityId::from_raw(7), EntityType::Wall)
            .with(Positionable::new(Vec2::new(16.0, 16.0)).at(Vec2::new(3.0, 4.0)))
            .with(Destructible::new(10).with_health(7))
    }

    #[test]
    fn id_round_trips_through_string() {
        let id = EntityId::from_raw(42);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!("42"));
        let back: EntityId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_value::<EntityId>(serde_json::json!("abc")).is_err());
    }

    #[test]
    fn entity_type_parses_wire_tags() {
        for ty in EntityType::ALL {
            assert_eq!(ty.as_str().parse::<EntityType>().unwrap(), ty);
        }
        assert_eq!(
            "dragon".parse::<EntityType>(),
            Err(UnknownEntityType("dragon".to_owned()))
        );
    }

    #[test]
    fn ext_after_remove_is_not_found() {
        let mut e = wall();
        assert!(e.has_ext::<Destructible>());
        assert!(e.remove::<Destructible>().is_some());
        assert!(!e.has(ExtensionKind::Destructible));
        assert!(matches!(
            e.ext::<Destructible>(),
            Err(EcsError::ExtensionNotFound {
                kind: ExtensionKind::Destructible,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_kind_is_rejected() {
        let mut e = wall();
        let err = e
            .add_extension(Destructible::new(1))
            .expect_err("second destructible must fail");
        assert!(matches!(err, EcsError::DuplicateExtension { .. }));
        assert_eq!(e.ext::<Destructible>().unwrap().health(), 7);
    }

    #[test]
    #[should_panic(expected = "duplicate extension kind")]
    fn builder_panics_on_duplicate() {
        let _ = Entity::new(EntityId::from_raw(1), EntityType::Bullet)
            .with(Movable::new())
            .with(Movable::new());
    }

    #[test]
    fn serialize_keeps_attach_order() {
        let mut e = Entity::new(EntityId::from_raw(3), EntityType::Bullet)
            .with(Updatable::default())
            .with(Movable::new())
            .with(Positionable::default());
        e.remove_extension(ExtensionKind::Movable);
        e.add_extension(Movable::new()).unwrap();
        let kinds: Vec<_> = e.serialize().extensions.iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ExtensionKind::Updatable,
                ExtensionKind::Positionable,
                ExtensionKind::Movable
            ]
        );
    }

    #[test]
    fn serialized_fields_are_bit_exact() {
        let record = wall().serialize();
        let json = serde_json::to_string(&record).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let pos = &value["extensions"][0]["position"];
        assert_eq!(pos["x"].as_f64(), Some(3.0));
        assert_eq!(pos["y"].as_f64(), Some(4.0));
        assert_eq!(value["extensions"][1]["health"].as_u64(), Some(7));
    }

    #[test]
    fn damage_box_is_full_footprint() {
        let e = wall();
        assert_eq!(e.hitbox(), None);
        assert_eq!(e.damage_box(), Some(Rect::new(3.0, 4.0, 16.0, 16.0)));
    }
}
