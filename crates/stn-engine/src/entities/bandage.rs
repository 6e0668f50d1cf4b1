//! Bandage: a carryable heal. Pickups always append a new slot.

use stn_ecs::prelude::*;

use super::{report, BANDAGE, TILE};

/// Health restored by consuming one bandage.
pub const BANDAGE_HEAL: u32 = 1;

pub fn spawn_bandage(manager: &mut EntityManager, position: Vec2) -> EntityId {
    manager.spawn(EntityType::Bandage, |e| {
        e.with(Positionable::new(TILE).at(position))
            .with(
                Interactive::new()
                    .with_display_name(BANDAGE)
                    .on_interact(|m: &mut EntityManager, me, actor| {
                        let result = pickup(m, me, actor, PickupOptions::new()).map(|_| ());
                        report(me, "bandage pickup", result);
                    }),
            )
            .with(Carryable::new(BANDAGE))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bandages_append_separate_slots() {
        let mut m = EntityManager::new(EventLog::new(), 0);
        let player = m.spawn(EntityType::Player, |e| e.with(Inventory::new(8)));
        let a = spawn_bandage(&mut m, Vec2::ZERO);
        let b = spawn_bandage(&mut m, Vec2::ZERO);
        m.interact(a, player);
        m.interact(b, player);
        let inv = m.entity(player).unwrap().ext::<Inventory>().unwrap();
        assert_eq!(inv.len(), 2);
        assert!(inv.items().iter().all(|i| i.item_type == BANDAGE && i.state.is_none()));
    }

    #[test]
    fn full_inventory_leaves_bandage_in_world() {
        let mut m = EntityManager::new(EventLog::new(), 0);
        let player = m.spawn(EntityType::Player, |e| e.with(Inventory::new(0)));
        let a = spawn_bandage(&mut m, Vec2::ZERO);
        m.interact(a, player);
        m.update(0.1);
        assert!(m.entity(a).is_some());
    }
}
