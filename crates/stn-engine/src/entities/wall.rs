//! Wall: a placeable, destructible obstacle.
//!
//! Picking a wall up stores its current health on the inventory item, and
//! placing it again restores that health.

use stn_ecs::prelude::*;

use super::{report, TILE, WALL};

pub const WALL_HEALTH: u32 = 10;

pub fn spawn_wall(manager: &mut EntityManager, position: Vec2, health: u32) -> EntityId {
    manager.spawn(EntityType::Wall, |e| {
        e.with(Positionable::new(TILE).at(position))
            .with(Collidable::new(TILE))
            .with(
                Destructible::new(WALL_HEALTH)
                    .with_health(health.min(WALL_HEALTH))
                    .on_death(|m: &mut EntityManager, me| {
                        m.mark_entity_for_removal(me);
                    }),
            )
            .with(
                Interactive::new()
                    .with_display_name(WALL)
                    .on_interact(|m: &mut EntityManager, me, actor| {
                        report(me, "wall pickup", pick_up_wall(m, me, actor));
                    }),
            )
            .with(Carryable::new(WALL))
    })
}

fn pick_up_wall(manager: &mut EntityManager, wall: EntityId, actor: EntityId) -> Result<(), EcsError> {
    let health = manager.get(wall)?.ext::<Destructible>()?.health();
    let mut state = ItemState::new();
    state.insert("health".to_owned(), serde_json::json!(health));
    pickup(manager, wall, actor, PickupOptions::new().with_state(state))?;
    Ok(())
}
