//! Item-side extensions: carryable world items, inventories, and the generic
//! interact trigger.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::manager::EntityManager;
use crate::snapshot::ExtensionRecord;

/// Opaque per-item state carried across pickup and drop (e.g. `{"count": 10}`).
///
/// A `BTreeMap` keeps key order stable on the wire.
pub type ItemState = BTreeMap<String, serde_json::Value>;

/// Interact handler: `(manager, self_id, actor_id)`.
pub type InteractFn = Box<dyn FnMut(&mut EntityManager, EntityId, EntityId)>;

// ---------------------------------------------------------------------------
// InventoryItem
// ---------------------------------------------------------------------------

/// One inventory slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ItemState>,
}

impl InventoryItem {
    pub fn new(item_type: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            state: None,
        }
    }

    pub fn with_state(mut self, state: ItemState) -> Self {
        self.state = Some(state);
        self
    }

    /// Integer field of the state payload, if present.
    pub fn state_u64(&self, key: &str) -> Option<u64> {
        self.state.as_ref()?.get(key)?.as_u64()
    }
}

// ---------------------------------------------------------------------------
// Carryable
// ---------------------------------------------------------------------------

/// Marks a standalone world entity as something that can become an
/// inventory item. The transfer itself lives in [`crate::pickup`].
#[derive(Debug, Clone, PartialEq)]
pub struct Carryable {
    item_type: String,
    state: ItemState,
}

impl Carryable {
    pub fn new(item_type: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            state: ItemState::new(),
        }
    }

    pub fn with_state(mut self, state: ItemState) -> Self {
        self.state = state;
        self
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub fn item_state(&self) -> &ItemState {
        &self.state
    }

    pub fn set_item_state(&mut self, state: ItemState) {
        self.state = state;
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Carryable {
            item_type: self.item_type.clone(),
            state: self.state.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Fixed-capacity list of carried items.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    items: Vec<InventoryItem>,
    capacity: usize,
}

impl Inventory {
    pub const DEFAULT_CAPACITY: usize = 8;

    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn with_items(mut self, items: Vec<InventoryItem>) -> Self {
        self.items = items;
        self
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&InventoryItem> {
        self.items.get(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut InventoryItem> {
        self.items.get_mut(index)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Index of the first item of `item_type`.
    pub fn find(&self, item_type: &str) -> Option<usize> {
        self.items.iter().position(|item| item.item_type == item_type)
    }

    pub fn has_item(&self, item_type: &str) -> bool {
        self.find(item_type).is_some()
    }

    /// Append an item. Returns `false` (and leaves the inventory untouched)
    /// when full.
    pub fn add_item(&mut self, item: InventoryItem) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Replace the state of the item at `index` in place.
    pub fn update_item_state(&mut self, index: usize, state: ItemState) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.state = Some(state);
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, index: usize) -> Option<InventoryItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Inventory {
            items: self.items.clone(),
            capacity: self.capacity,
        }
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Interactive
// ---------------------------------------------------------------------------

/// Generic "interact" trigger (doors, pickups, harvestables). The behaviour
/// is wired by the assembly function.
#[derive(Default)]
pub struct Interactive {
    display_name: Option<String>,
    handler: Option<InteractFn>,
}

impl Interactive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_interact<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&mut EntityManager, EntityId, EntityId) + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub(crate) fn take_handler(&mut self) -> Option<InteractFn> {
        self.handler.take()
    }

    pub(crate) fn restore_handler(&mut self, handler: InteractFn) {
        if self.handler.is_none() {
            self.handler = Some(handler);
        }
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Interactive {
            display_name: self.display_name.clone(),
        }
    }
}

impl fmt::Debug for Interactive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interactive")
            .field("display_name", &self.display_name)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
