//! Pistol and shotgun ammo boxes.
//!
//! Ammo always takes the merge path on pickup: a second box of the same
//! kind adds its count to the existing slot instead of using a new one.

use stn_ecs::prelude::*;

use super::{count_state, report, PISTOL_AMMO, SHOTGUN_AMMO, TILE};

pub const PISTOL_AMMO_COUNT: u64 = 10;
pub const SHOTGUN_AMMO_COUNT: u64 = 5;

pub fn spawn_pistol_ammo(manager: &mut EntityManager, position: Vec2, count: u64) -> EntityId {
    spawn_ammo(
        manager,
        EntityType::PistolAmmo,
        PISTOL_AMMO,
        "pistol ammo",
        PISTOL_AMMO_COUNT,
        position,
        count,
    )
}

pub fn spawn_shotgun_ammo(manager: &mut EntityManager, position: Vec2, count: u64) -> EntityId {
    spawn_ammo(
        manager,
        EntityType::ShotgunAmmo,
        SHOTGUN_AMMO,
        "shotgun ammo",
        SHOTGUN_AMMO_COUNT,
        position,
        count,
    )
}

fn spawn_ammo(
    manager: &mut EntityManager,
    entity_type: EntityType,
    item_type: &'static str,
    display_name: &'static str,
    default_count: u64,
    position: Vec2,
    count: u64,
) -> EntityId {
    manager.spawn(entity_type, |e| {
        e.with(Positionable::new(TILE).at(position))
            .with(
                Interactive::new()
                    .with_display_name(display_name)
                    .on_interact(move |m: &mut EntityManager, me, actor| {
                        report(me, "ammo pickup", pick_up_ammo(m, me, actor, default_count));
                    }),
            )
            .with(Carryable::new(item_type).with_state(count_state(count)))
    })
}

fn pick_up_ammo(
    manager: &mut EntityManager,
    ammo: EntityId,
    actor: EntityId,
    default_count: u64,
) -> Result<(), EcsError> {
    let carried = manager.get(ammo)?.ext::<Carryable>()?.item_state().clone();
    let state = if carried.contains_key("count") {
        carried
    } else {
        count_state(default_count)
    };
    let merge = sum_counts(default_count);
    let options = PickupOptions::new().with_state(state).with_merge(&merge);
    pickup(manager, ammo, actor, options)?;
    Ok(())
}
