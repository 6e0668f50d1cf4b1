//! Player: the input-driven survivor.
//!
//! The host writes an [`Input`] into the player's [`Controllable`] before
//! each tick. The per-tick callback then, in order:
//!
//! 1. fires the active weapon if `fire` is held and the cooldown allows it,
//! 2. moves by the normalized input direction times the player speed,
//!    reverting any axis step that runs into something,
//! 3. interacts with the nearest interactive entity in reach,
//! 4. drops the active item back into the world (walls go on the free tile
//!    ahead of the player),
//! 5. consumes the active item if it is a bandage.
//!
//! `interact`, `drop` and `consume` are one-shot: they are cleared once the
//! tick has handled them. A dead player ignores its input entirely.

use stn_ecs::prelude::*;
use tracing::debug;

use super::bandage::BANDAGE_HEAL;
use super::bullet::{spawn_bullet, velocity_towards};
use super::{
    count_state, is_droppable, move_with_collisions, report, spawn_item, BANDAGE, KNIFE,
    PISTOL, PISTOL_AMMO, SHOTGUN, SHOTGUN_AMMO, TILE, WALL,
};
use crate::config::Tuning;

pub const PLAYER_HEALTH: u32 = 3;

/// Entity types a player walks through.
const PASSABLE: [EntityType; 3] = [EntityType::Player, EntityType::Bullet, EntityType::Fire];

const PISTOL_SPREAD: [f64; 1] = [0.0];
const SHOTGUN_SPREAD: [f64; 3] = [-10.0, 0.0, 10.0];

/// Every player starts with these, in slot order.
pub fn starting_loadout() -> Vec<InventoryItem> {
    [KNIFE, PISTOL, SHOTGUN]
        .into_iter()
        .map(InventoryItem::new)
        .collect()
}

pub fn spawn_player(manager: &mut EntityManager, position: Vec2, tuning: &Tuning) -> EntityId {
    let tuning = *tuning;
    let mut fire_cooldown = Cooldown::new(tuning.fire_cooldown);
    manager.spawn(EntityType::Player, |e| {
        e.with(Positionable::new(TILE).at(position))
            .with(Movable::new())
            .with(Collidable::new(TILE))
            .with(
                Destructible::new(PLAYER_HEALTH).on_death(|m: &mut EntityManager, me| {
                    if let Some(movable) = m.entity_mut(me).and_then(|e| e.try_ext_mut::<Movable>()) {
                        movable.set_velocity(Vec2::ZERO);
                    }
                    m.broadcast(GameEvent::PlayerDeath { player_id: me });
                }),
            )
            .with(Inventory::new(tuning.inventory_slots).with_items(starting_loadout()))
            .with(Groupable::new(Group::Friendly))
            .with(Controllable::new())
            .with(Updatable::new(move |m: &mut EntityManager, me, dt| {
                report(
                    me,
                    "player update",
                    update_player(m, me, dt, &mut fire_cooldown, &tuning),
                );
            }))
    })
}

/// The inventory item in the slot the current input selects.
pub fn active_item(entity: &Entity) -> Option<&InventoryItem> {
    let input = entity.try_ext::<Controllable>()?.input();
    entity.try_ext::<Inventory>()?.item(input.slot_index())
}

fn update_player(
    manager: &mut EntityManager,
    id: EntityId,
    delta_time: f64,
    fire_cooldown: &mut Cooldown,
    tuning: &Tuning,
) -> Result<(), EcsError> {
    fire_cooldown.update(delta_time);

    let entity = manager.get(id)?;
    if entity.is_dead() {
        return Ok(());
    }
    let input = entity.ext::<Controllable>()?.input();
    let active = active_item(entity).map(|item| item.item_type.clone());

    if input.fire && fire_cooldown.is_ready() {
        if let Some(weapon) = active.as_deref() {
            if fire(manager, id, weapon, input.facing, tuning)? {
                fire_cooldown.reset();
            }
        }
    }

    let velocity = input.movement() * tuning.player_speed;
    manager.get_mut(id)?.ext_mut::<Movable>()?.set_velocity(velocity);
    move_with_collisions(manager, id, velocity, delta_time, &PASSABLE)?;

    if input.interact {
        let reach = tuning.interact_radius;
        let target = manager.nearest_entity(id, reach, |e| {
            e.has_ext::<Interactive>() && !manager.is_marked_for_removal(e.id())
        });
        if let Some(target) = target {
            manager.interact(target, id);
        }
    }

    if input.drop {
        drop_active_item(manager, id, input.slot_index())?;
    }

    if input.consume && active.as_deref() == Some(BANDAGE) {
        manager
            .get_mut(id)?
            .ext_mut::<Inventory>()?
            .remove_item(input.slot_index());
        manager.heal(id, BANDAGE_HEAL);
        debug!(player = %id, "bandage used");
    }

    let held = manager.get_mut(id)?.ext_mut::<Controllable>()?.input_mut();
    held.interact = false;
    held.drop = false;
    held.consume = false;
    Ok(())
}

/// Shoot `weapon` if it is a firearm with ammo. Returns whether a shot went
/// off.
fn fire(
    manager: &mut EntityManager,
    id: EntityId,
    weapon: &str,
    facing: Direction,
    tuning: &Tuning,
) -> Result<bool, EcsError> {
    let (ammo, spread): (&str, &[f64]) = match weapon {
        PISTOL => (PISTOL_AMMO, &PISTOL_SPREAD[..]),
        SHOTGUN => (SHOTGUN_AMMO, &SHOTGUN_SPREAD[..]),
        _ => return Ok(false),
    };
    if !consume_round(manager.get_mut(id)?.ext_mut::<Inventory>()?, ammo) {
        debug!(player = %id, weapon, "out of ammo");
        return Ok(false);
    }

    let origin = manager
        .get(id)?
        .center_position()
        .ok_or(EcsError::ExtensionNotFound {
            entity: id,
            kind: ExtensionKind::Positionable,
        })?;
    for offset in spread {
        let velocity = velocity_towards(facing, *offset, tuning.bullet_speed);
        spawn_bullet(manager, origin, velocity, tuning);
    }
    Ok(true)
}

/// Take one round from the `ammo` slot, freeing the slot when it empties.
fn consume_round(inventory: &mut Inventory, ammo: &str) -> bool {
    let Some(index) = inventory.find(ammo) else {
        return false;
    };
    let count = inventory
        .item(index)
        .and_then(|item| item.state_u64("count"))
        .unwrap_or(0);
    if count <= 1 {
        inventory.remove_item(index);
        return count == 1;
    }
    inventory.update_item_state(index, count_state(count - 1))
}

fn drop_active_item(manager: &mut EntityManager, id: EntityId, slot: usize) -> Result<(), EcsError> {
    let entity = manager.get(id)?;
    let Some(item_type) = entity
        .ext::<Inventory>()?
        .item(slot)
        .map(|item| item.item_type.clone())
        .filter(|item_type| is_droppable(item_type))
    else {
        return Ok(());
    };
    let origin = entity.ext::<Positionable>()?.position();

    let position = if item_type == WALL {
        let facing = entity.ext::<Controllable>()?.input().facing;
        let ahead = tile_ahead(origin, facing);
        if !manager.collidables_in(Rect::new(ahead.x, ahead.y, TILE.x, TILE.y)).is_empty() {
            debug!(player = %id, "no room to place wall");
            return Ok(());
        }
        ahead
    } else {
        origin
    };

    let Some(item) = manager.get_mut(id)?.ext_mut::<Inventory>()?.remove_item(slot) else {
        return Ok(());
    };
    spawn_item(manager, &item, position);
    manager.broadcast(GameEvent::PlayerDroppedItem {
        player_id: id,
        item_type: item.item_type,
    });
    Ok(())
}

/// Position of the tile next to `position` in the `facing` direction.
fn tile_ahead(position: Vec2, facing: Direction) -> Vec2 {
    let dir = facing.normalize();
    let step = |v: f64| {
        if v > 0.0 {
            1.0
        } else if v < 0.0 {
            -1.0
        } else {
            0.0
        }
    };
    position + Vec2::new(step(dir.x) * TILE.x, step(dir.y) * TILE.y)
}
