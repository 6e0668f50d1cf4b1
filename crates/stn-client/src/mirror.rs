//! Display-side mirrors, one per renderable entity type.
//!
//! Each mirror copies the handful of fields its renderer draws straight off
//! the flat record. Optional extensions fall back to neutral values; an
//! extension the type cannot be drawn without (position for everything,
//! health for players, zombies and walls) is a [`MalformedRecord`].
//!
//! [`MalformedRecord`]: ReconstructError::MalformedRecord

use serde_json::Value;
use stn_ecs::prelude::{EntityId, EntityType, ExtensionKind, Input, InventoryItem, ItemState, Vec2};

use crate::record::RecordView;
use crate::ReconstructError;

// ---------------------------------------------------------------------------
// Mirrors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMirror {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub inventory: Vec<InventoryItem>,
    pub input: Input,
}

impl PlayerMirror {
    fn from_view(view: &RecordView<'_>) -> Result<Self, ReconstructError> {
        Ok(Self {
            id: view.id(),
            position: view.field(ExtensionKind::Positionable, "position")?,
            velocity: view
                .optional_field(ExtensionKind::Movable, "velocity")?
                .unwrap_or_default(),
            health: view.field(ExtensionKind::Destructible, "health")?,
            max_health: view.field(ExtensionKind::Destructible, "maxHealth")?,
            inventory: view
                .optional_field(ExtensionKind::Inventory, "items")?
                .unwrap_or_default(),
            input: view
                .optional_field(ExtensionKind::Controllable, "input")?
                .unwrap_or_default(),
        })
    }

    /// The item in the slot the player has selected.
    pub fn active_item(&self) -> Option<&InventoryItem> {
        self.inventory.get(self.input.slot_index())
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZombieMirror {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: u32,
    pub max_health: u32,
    /// Currently burning; drawn with a flame overlay.
    pub ignited: bool,
}

impl ZombieMirror {
    fn from_view(view: &RecordView<'_>) -> Result<Self, ReconstructError> {
        Ok(Self {
            id: view.id(),
            position: view.field(ExtensionKind::Positionable, "position")?,
            velocity: view
                .optional_field(ExtensionKind::Movable, "velocity")?
                .unwrap_or_default(),
            health: view.field(ExtensionKind::Destructible, "health")?,
            max_health: view.field(ExtensionKind::Destructible, "maxHealth")?,
            ignited: view.has(ExtensionKind::Ignitable),
        })
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletMirror {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl BulletMirror {
    fn from_view(view: &RecordView<'_>) -> Result<Self, ReconstructError> {
        Ok(Self {
            id: view.id(),
            position: view.field(ExtensionKind::Positionable, "position")?,
            velocity: view
                .optional_field(ExtensionKind::Movable, "velocity")?
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallMirror {
    pub id: EntityId,
    pub position: Vec2,
    pub health: u32,
    pub max_health: u32,
}

impl WallMirror {
    fn from_view(view: &RecordView<'_>) -> Result<Self, ReconstructError> {
        Ok(Self {
            id: view.id(),
            position: view.field(ExtensionKind::Positionable, "position")?,
            health: view.field(ExtensionKind::Destructible, "health")?,
            max_health: view.field(ExtensionKind::Destructible, "maxHealth")?,
        })
    }
}

/// Ammo boxes and bandages lying in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemMirror {
    pub id: EntityId,
    pub entity_type: EntityType,
    pub item_type: String,
    pub display_name: Option<String>,
    pub position: Vec2,
    pub state: ItemState,
}

impl ItemMirror {
    fn from_view(view: &RecordView<'_>) -> Result<Self, ReconstructError> {
        Ok(Self {
            id: view.id(),
            entity_type: view.entity_type(),
            item_type: view.field(ExtensionKind::Carryable, "itemType")?,
            display_name: view.optional_field(ExtensionKind::Interactive, "displayName")?,
            position: view.field(ExtensionKind::Positionable, "position")?,
            state: view
                .optional_field(ExtensionKind::Carryable, "state")?
                .unwrap_or_default(),
        })
    }

    /// Stack size for ammo, shown next to the sprite.
    pub fn count(&self) -> Option<u64> {
        self.state.get("count").and_then(Value::as_u64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FireMirror {
    pub id: EntityId,
    pub position: Vec2,
}

impl FireMirror {
    fn from_view(view: &RecordView<'_>) -> Result<Self, ReconstructError> {
        Ok(Self {
            id: view.id(),
            position: view.field(ExtensionKind::Positionable, "position")?,
        })
    }
}

// ---------------------------------------------------------------------------
// ClientEntity
// ---------------------------------------------------------------------------

/// A reconstructed entity of any type.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEntity {
    Player(PlayerMirror),
    Zombie(ZombieMirror),
    Bullet(BulletMirror),
    Wall(WallMirror),
    Item(ItemMirror),
    Fire(FireMirror),
}

impl ClientEntity {
    /// Build the mirror matching the record's type tag.
    pub fn from_view(view: &RecordView<'_>) -> Result<Self, ReconstructError> {
        let entity = match view.entity_type() {
            EntityType::Player => ClientEntity::Player(PlayerMirror::from_view(view)?),
            EntityType::Zombie => ClientEntity::Zombie(ZombieMirror::from_view(view)?),
            EntityType::Bullet => ClientEntity::Bullet(BulletMirror::from_view(view)?),
            EntityType::Wall => ClientEntity::Wall(WallMirror::from_view(view)?),
            EntityType::PistolAmmo | EntityType::ShotgunAmmo | EntityType::Bandage => {
                ClientEntity::Item(ItemMirror::from_view(view)?)
            }
            EntityType::Fire => ClientEntity::Fire(FireMirror::from_view(view)?),
        };
        Ok(entity)
    }

    pub fn id(&self) -> EntityId {
        match self {
            ClientEntity::Player(m) => m.id,
            ClientEntity::Zombie(m) => m.id,
            ClientEntity::Bullet(m) => m.id,
            ClientEntity::Wall(m) => m.id,
            ClientEntity::Item(m) => m.id,
            ClientEntity::Fire(m) => m.id,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            ClientEntity::Player(_) => EntityType::Player,
            ClientEntity::Zombie(_) => EntityType::Zombie,
            ClientEntity::Bullet(_) => EntityType::Bullet,
            ClientEntity::Wall(_) => EntityType::Wall,
            ClientEntity::Item(m) => m.entity_type,
            ClientEntity::Fire(_) => EntityType::Fire,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            ClientEntity::Player(m) => m.position,
            ClientEntity::Zombie(m) => m.position,
            ClientEntity::Bullet(m) => m.position,
            ClientEntity::Wall(m) => m.position,
            ClientEntity::Item(m) => m.position,
            ClientEntity::Fire(m) => m.position,
        }
    }

    /// Refresh from a newer record of the same entity.
    ///
    /// # Errors
    ///
    /// Rejects a record for a different id or type, or one that does not
    /// parse. On error the mirror is left unchanged.
    pub fn deserialize(&mut self, record: &Value) -> Result<(), ReconstructError> {
        let view = RecordView::parse(record)?;
        if view.id() != self.id() || view.entity_type() != self.entity_type() {
            return Err(ReconstructError::malformed(format!(
                "record {} ({}) cannot update mirror {} ({})",
                view.id(),
                view.entity_type(),
                self.id(),
                self.entity_type()
            )));
        }
        *self = ClientEntity::from_view(&view)?;
        Ok(())
    }
}
