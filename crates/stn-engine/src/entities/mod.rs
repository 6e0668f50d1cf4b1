//! Assembly functions for every entity type.
//!
//! Each `spawn_*` function attaches a fixed set of extensions to a new entity
//! and wires its behaviour as closures. Gameplay constants come from the
//! [`Tuning`](crate::config::Tuning) block, copied into the closures at
//! spawn time.

use stn_ecs::prelude::*;
use tracing::{debug, error};

pub mod ammo;
pub mod bandage;
pub mod bullet;
pub mod fire;
pub mod player;
pub mod wall;
pub mod zombie;

// ---------------------------------------------------------------------------
// Item types
// ---------------------------------------------------------------------------

pub const KNIFE: &str = "knife";
pub const PISTOL: &str = "pistol";
pub const SHOTGUN: &str = "shotgun";
pub const PISTOL_AMMO: &str = "pistol_ammo";
pub const SHOTGUN_AMMO: &str = "shotgun_ammo";
pub const BANDAGE: &str = "bandage";
pub const WALL: &str = "wall";

/// Footprint shared by players, zombies, walls and world items.
pub const TILE: Vec2 = Vec2::new(16.0, 16.0);

/// `{ "count": n }`
pub fn count_state(count: u64) -> ItemState {
    let mut state = ItemState::new();
    state.insert("count".to_owned(), serde_json::json!(count));
    state
}

/// Whether an inventory item of `item_type` can exist as a world entity.
pub fn is_droppable(item_type: &str) -> bool {
    matches!(item_type, PISTOL_AMMO | SHOTGUN_AMMO | BANDAGE | WALL)
}

/// Re-materialize an inventory item as a world entity at `position`,
/// carrying its state. Returns `None` for items that only exist in
/// inventories.
pub fn spawn_item(
    manager: &mut EntityManager,
    item: &InventoryItem,
    position: Vec2,
) -> Option<EntityId> {
    let id = match item.item_type.as_str() {
        PISTOL_AMMO => ammo::spawn_pistol_ammo(
            manager,
            position,
            item.state_u64("count").unwrap_or(ammo::PISTOL_AMMO_COUNT),
        ),
        SHOTGUN_AMMO => ammo::spawn_shotgun_ammo(
            manager,
            position,
            item.state_u64("count").unwrap_or(ammo::SHOTGUN_AMMO_COUNT),
        ),
        BANDAGE => bandage::spawn_bandage(manager, position),
        WALL => {
            let health = item
                .state_u64("health")
                .and_then(|h| u32::try_from(h).ok())
                .unwrap_or(wall::WALL_HEALTH);
            wall::spawn_wall(manager, position, health)
        }
        other => {
            debug!(item_type = %other, "item has no world representation");
            return None;
        }
    };
    Some(id)
}

/// Log a failed behaviour callback. A missing extension inside an assembly's
/// own callback means the assembly was wired wrong.
pub(crate) fn report(id: EntityId, what: &'static str, result: Result<(), EcsError>) {
    if let Err(err) = result {
        error!(entity = %id, error = %err, "{what} failed");
    }
}

/// Move `id` by `velocity * dt` one axis at a time, undoing each axis step
/// that runs into something not in `excluded`. Overlaps that were already
/// there before the step do not block it.
pub(crate) fn move_with_collisions(
    manager: &mut EntityManager,
    id: EntityId,
    velocity: Vec2,
    delta_time: f64,
    excluded: &[EntityType],
) -> Result<(), EcsError> {
    let steps = [
        Vec2::new(velocity.x * delta_time, 0.0),
        Vec2::new(0.0, velocity.y * delta_time),
    ];
    for step in steps {
        if step.is_zero() {
            continue;
        }
        let previous = manager.get(id)?.ext::<Positionable>()?.position();
        let overlapping = manager.colliding_entities(id, excluded);
        manager
            .get_mut(id)?
            .ext_mut::<Positionable>()?
            .set_position(previous + step);
        let blocked = manager
            .colliding_entities(id, excluded)
            .iter()
            .any(|other| !overlapping.contains(other));
        if blocked {
            manager
                .get_mut(id)?
                .ext_mut::<Positionable>()?
                .set_position(previous);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> EntityManager {
        EntityManager::new(EventLog::new(), 1)
    }

    #[test]
    fn dropped_ammo_keeps_its_count() {
        let mut m = manager();
        let item = InventoryItem::new(PISTOL_AMMO).with_state(count_state(3));
        let id = spawn_item(&mut m, &item, Vec2::new(5.0, 5.0)).unwrap();
        let e = m.entity(id).unwrap();
        assert_eq!(e.entity_type(), EntityType::PistolAmmo);
        assert_eq!(
            e.ext::<Carryable>().unwrap().item_state().get("count"),
            Some(&serde_json::json!(3))
        );
    }

    #[test]
    fn weapons_have_no_world_form() {
        let mut m = manager();
        let item = InventoryItem::new(PISTOL);
        assert!(spawn_item(&mut m, &item, Vec2::ZERO).is_none());
        assert!(m.is_empty());
        assert!(!is_droppable(KNIFE));
    }

    #[test]
    fn movement_reverts_blocked_axis_only() {
        let mut m = manager();
        let mover = m.spawn(EntityType::Player, |e| {
            e.with(Positionable::new(TILE))
                .with(Collidable::new(TILE))
        });
        m.spawn(EntityType::Wall, |e| {
            e.with(Positionable::new(TILE).at(Vec2::new(20.0, 0.0)))
                .with(Collidable::new(TILE))
        });
        move_with_collisions(&mut m, mover, Vec2::new(10.0, 10.0), 1.0, &[]).unwrap();
        assert_eq!(m.position_of(mover), Some(Vec2::new(0.0, 10.0)));
    }

    #[test]
    fn existing_overlap_does_not_pin_the_mover() {
        let mut m = manager();
        let mover = m.spawn(EntityType::Zombie, |e| {
            e.with(Positionable::new(TILE))
                .with(Collidable::new(TILE))
        });
        m.spawn(EntityType::Wall, |e| {
            e.with(Positionable::new(TILE).at(Vec2::new(4.0, 0.0)))
                .with(Collidable::new(TILE))
        });
        m.spawn(EntityType::Wall, |e| {
            e.with(Positionable::new(TILE).at(Vec2::new(0.0, 20.0)))
                .with(Collidable::new(TILE))
        });

        move_with_collisions(&mut m, mover, Vec2::new(-10.0, 0.0), 1.0, &[]).unwrap();
        assert_eq!(m.position_of(mover), Some(Vec2::new(-10.0, 0.0)));

        // Still overlapping the first wall, but stepping into the second is blocked.
        m.get_mut(mover)
            .unwrap()
            .ext_mut::<Positionable>()
            .unwrap()
            .set_position(Vec2::new(0.0, 0.0));
        move_with_collisions(&mut m, mover, Vec2::new(0.0, 10.0), 1.0, &[]).unwrap();
        assert_eq!(m.position_of(mover), Some(Vec2::ZERO));
    }
}
