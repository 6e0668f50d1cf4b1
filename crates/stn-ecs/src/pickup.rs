//! Transfer of a [`Carryable`] world entity into an [`Inventory`].
//!
//! Two paths exist:
//!
//! * **merge**: with a merge strategy, an existing slot of the same item type
//!   is updated in place and no new slot is used;
//! * **append**: otherwise a new slot is pushed, failing when full.
//!
//! The merge path only applies when both the existing slot and the incoming
//! pickup carry a state payload. When either side has none, the pickup falls
//! through to the append path. Ammo pickups always supply both, so this only
//! shows up for items stored without state.
//!
//! Every failure here is a routine runtime race (target gone, item already
//! taken, inventory full) and degrades to `Ok(false)` with nothing mutated.
//! The only hard error is calling this on an entity that is not carryable.

use tracing::debug;

use crate::entity::EntityId;
use crate::event::GameEvent;
use crate::extension::{Carryable, Inventory, InventoryItem, ItemState};
use crate::manager::EntityManager;
use crate::EcsError;

/// Combines an existing slot's state with the incoming one.
pub type MergeFn = dyn Fn(&ItemState, &ItemState) -> ItemState;

/// Optional parameters of [`pickup`].
#[derive(Default)]
pub struct PickupOptions<'a> {
    /// State stored on the new (or merged) inventory item.
    pub state: Option<ItemState>,
    /// Enables the merge path.
    pub merge_strategy: Option<&'a MergeFn>,
}

impl<'a> PickupOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: ItemState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_merge(mut self, merge: &'a MergeFn) -> Self {
        self.merge_strategy = Some(merge);
        self
    }
}

/// Move `item` into `target`'s inventory.
///
/// On success the item is marked for removal and a
/// [`GameEvent::PlayerPickedUpItem`] is broadcast.
pub fn pickup(
    manager: &mut EntityManager,
    item: EntityId,
    target: EntityId,
    options: PickupOptions<'_>,
) -> Result<bool, EcsError> {
    let item_type = manager.get(item)?.ext::<Carryable>()?.item_type().to_owned();

    if manager.is_marked_for_removal(item) {
        debug!(item = %item, target = %target, "item already taken this tick");
        return Ok(false);
    }

    let Some(inventory) = manager
        .entity_mut(target)
        .and_then(|e| e.try_ext_mut::<Inventory>())
    else {
        debug!(target = %target, item_type = %item_type, "pickup target missing or has no inventory");
        return Ok(false);
    };

    if inventory.is_full() && options.merge_strategy.is_none() {
        debug!(target = %target, item_type = %item_type, "inventory full");
        return Ok(false);
    }

    let merged = match (options.merge_strategy, options.state.as_ref()) {
        (Some(merge), Some(incoming)) => merge_into(inventory, &item_type, merge, incoming),
        _ => false,
    };

    if !merged {
        if inventory.is_full() {
            debug!(target = %target, item_type = %item_type, "inventory still full after merge check");
            return Ok(false);
        }
        inventory.add_item(InventoryItem {
            item_type: item_type.clone(),
            state: options.state,
        });
    }

    manager.mark_entity_for_removal(item);
    manager.broadcast(GameEvent::PlayerPickedUpItem {
        player_id: target,
        item_type,
    });
    Ok(true)
}

/// Merge into the first slot of `item_type` when it carries state.
fn merge_into(inventory: &mut Inventory, item_type: &str, merge: &MergeFn, incoming: &ItemState) -> bool {
    let Some(index) = inventory.find(item_type) else {
        return false;
    };
    let Some(existing) = inventory.item(index).and_then(|slot| slot.state.as_ref()) else {
        return false;
    };
    let combined = merge(existing, incoming);
    inventory.update_item_state(index, combined)
}

/// Merge strategy that adds up the `count` fields of both states.
///
/// A missing count on the incoming side counts as `default_count`.
pub fn sum_counts(default_count: u64) -> impl Fn(&ItemState, &ItemState) -> ItemState {
    move |existing, incoming| {
        let have = existing.get("count").and_then(|v| v.as_u64()).unwrap_or(0);
        let add = incoming
            .get("count")
            .and_then(|v| v.as_u64())
            .unwrap_or(default_count);
        let mut merged = existing.clone();
        merged.insert("count".to_owned(), serde_json::json!(have.saturating_add(add)));
        merged
    }
}
