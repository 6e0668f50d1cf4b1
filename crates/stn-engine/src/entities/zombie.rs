//! Zombie: the hostile AI.
//!
//! A living zombie walks towards the nearest living player it can see and
//! hits it when close enough. With no player in sight it wanders, picking a
//! new heading (or standing still) every few seconds from the manager's
//! seeded generator. A dead zombie stays in the world as a corpse.

use rand::Rng;
use stn_ecs::prelude::*;

use super::{move_with_collisions, report, TILE};
use crate::config::Tuning;

pub const ZOMBIE_HEALTH: u32 = 3;
pub const ZOMBIE_ATTACK_DAMAGE: u32 = 1;

/// Wandering is slower than chasing.
const WANDER_SPEED_FACTOR: f64 = 0.5;

/// Entity types a zombie walks through.
const PASSABLE: [EntityType; 3] = [EntityType::Zombie, EntityType::Bullet, EntityType::Fire];

#[derive(Debug)]
struct ZombieBrain {
    attack_cooldown: Cooldown,
    wander_timer: f64,
    heading: Option<Direction>,
}

pub fn spawn_zombie(manager: &mut EntityManager, position: Vec2, tuning: &Tuning) -> EntityId {
    let tuning = *tuning;
    let mut brain = ZombieBrain {
        attack_cooldown: Cooldown::new(tuning.zombie_attack_cooldown),
        wander_timer: 0.0,
        heading: None,
    };
    manager.spawn(EntityType::Zombie, |e| {
        e.with(Positionable::new(TILE).at(position))
            .with(Movable::new())
            .with(Collidable::new(TILE))
            .with(
                Destructible::new(ZOMBIE_HEALTH).on_death(|m: &mut EntityManager, me| {
                    if let Some(movable) = m.entity_mut(me).and_then(|e| e.try_ext_mut::<Movable>()) {
                        movable.set_velocity(Vec2::ZERO);
                    }
                    m.broadcast(GameEvent::ZombieDeath { zombie_id: me });
                }),
            )
            .with(Groupable::new(Group::Enemy))
            .with(Updatable::new(move |m: &mut EntityManager, me, dt| {
                report(me, "zombie update", update_zombie(m, me, dt, &mut brain, &tuning));
            }))
    })
}

fn update_zombie(
    manager: &mut EntityManager,
    id: EntityId,
    delta_time: f64,
    brain: &mut ZombieBrain,
    tuning: &Tuning,
) -> Result<(), EcsError> {
    let entity = manager.get(id)?;
    if entity.is_dead() {
        return Ok(());
    }
    let center = entity.center_position().ok_or(EcsError::ExtensionNotFound {
        entity: id,
        kind: ExtensionKind::Positionable,
    })?;
    brain.attack_cooldown.update(delta_time);

    let target = manager.nearest_entity(id, tuning.zombie_sight_radius, |e| {
        e.entity_type() == EntityType::Player && !e.is_dead()
    });
    let target_center = target.and_then(|t| manager.entity(t)?.center_position());

    let velocity = match target_center {
        Some(goal) => (goal - center).normalize() * tuning.zombie_speed,
        None => wander(manager, brain, delta_time) * (tuning.zombie_speed * WANDER_SPEED_FACTOR),
    };
    manager.get_mut(id)?.ext_mut::<Movable>()?.set_velocity(velocity);
    move_with_collisions(manager, id, velocity, delta_time, &PASSABLE)?;

    let (Some(target), Some(goal)) = (target, target_center) else {
        return Ok(());
    };
    let now = manager.get(id)?.center_position().unwrap_or(center);
    if distance(now, goal) <= tuning.zombie_attack_radius && brain.attack_cooldown.is_ready() {
        brain.attack_cooldown.reset();
        manager.broadcast(GameEvent::PlayerHurt { player_id: target });
        manager.damage(target, ZOMBIE_ATTACK_DAMAGE);
    }
    Ok(())
}

/// Unit heading for this tick, re-rolled whenever the wander timer runs out.
fn wander(manager: &mut EntityManager, brain: &mut ZombieBrain, delta_time: f64) -> Vec2 {
    brain.wander_timer -= delta_time;
    if brain.wander_timer <= 0.0 {
        let rng = manager.rng();
        brain.heading = if rng.gen_bool(0.25) {
            None
        } else {
            Some(Direction::ALL[rng.gen_range(0..Direction::ALL.len())])
        };
        brain.wander_timer = rng.gen_range(1.0..3.0);
    }
    brain.heading.map_or(Vec2::ZERO, Direction::normalize)
}
