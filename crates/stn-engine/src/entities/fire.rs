//! Fire: a short-lived hazard that sets destructibles alight.
//!
//! Every tick the fire attaches a fresh [`Ignitable`] to each living
//! destructible overlapping it that is not already burning. It goes out
//! after `fire_lifetime` seconds.

use stn_ecs::prelude::*;
use tracing::debug;

use super::{report, TILE};
use crate::config::Tuning;

pub fn spawn_fire(manager: &mut EntityManager, position: Vec2, tuning: &Tuning) -> EntityId {
    let mut remaining = tuning.fire_lifetime;
    manager.spawn(EntityType::Fire, |e| {
        e.with(Positionable::new(TILE).at(position))
            .with(Collidable::new(TILE))
            .with(Updatable::new(move |m: &mut EntityManager, me, dt| {
                report(me, "fire update", update_fire(m, me, dt, &mut remaining));
            }))
    })
}

fn update_fire(
    manager: &mut EntityManager,
    id: EntityId,
    delta_time: f64,
    remaining: &mut f64,
) -> Result<(), EcsError> {
    let area = manager
        .get(id)?
        .hitbox()
        .ok_or(EcsError::ExtensionNotFound {
            entity: id,
            kind: ExtensionKind::Collidable,
        })?;

    for target in manager.nearby_intersecting_destructibles(id, area) {
        let entity = manager.get_mut(target)?;
        if !entity.has_ext::<Ignitable>() {
            entity.add_extension(Ignitable::default())?;
            debug!(fire = %id, target = %target, "ignited");
        }
    }

    *remaining -= delta_time;
    if *remaining <= 0.0 {
        manager.mark_entity_for_removal(id);
    }
    Ok(())
}
