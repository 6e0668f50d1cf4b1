//! Bullet: a one-shot projectile.
//!
//! Each tick the bullet moves by `velocity * dt` and accumulates the distance
//! travelled. The first living destructible of the enemy group that overlaps
//! its hitbox takes [`BULLET_DAMAGE`] and the bullet is removed; hitting a
//! zombie also broadcasts [`GameEvent::ZombieHurt`]. A bullet that travels
//! its full range without hitting anything is removed silently.

use stn_ecs::prelude::*;

use super::report;
use crate::config::Tuning;

pub const BULLET_SIZE: Vec2 = Vec2::new(1.0, 1.0);
pub const BULLET_DAMAGE: u32 = 1;

/// Spawn a bullet at `position` flying at `velocity`.
pub fn spawn_bullet(
    manager: &mut EntityManager,
    position: Vec2,
    velocity: Vec2,
    tuning: &Tuning,
) -> EntityId {
    let max_travel = tuning.bullet_max_travel;
    let mut traveled = 0.0;
    manager.spawn(EntityType::Bullet, |e| {
        e.with(Positionable::new(BULLET_SIZE).at(position))
            .with(Movable::new().with_velocity(velocity))
            .with(Updatable::new(move |m: &mut EntityManager, me, dt| {
                report(
                    me,
                    "bullet update",
                    update_bullet(m, me, dt, &mut traveled, max_travel),
                );
            }))
            .with(Collidable::new(BULLET_SIZE))
    })
}

/// Velocity for a shot towards `direction` rotated by `offset_degrees`.
pub fn velocity_towards(direction: Direction, offset_degrees: f64, speed: f64) -> Vec2 {
    direction
        .normalize()
        .rotate_degrees(offset_degrees)
        .normalize()
        * speed
}

pub fn set_direction(
    manager: &mut EntityManager,
    bullet: EntityId,
    direction: Direction,
    speed: f64,
) -> Result<(), EcsError> {
    set_direction_with_offset(manager, bullet, direction, 0.0, speed)
}

/// Aim along `direction` rotated by `offset_degrees`, used for spread shots.
pub fn set_direction_with_offset(
    manager: &mut EntityManager,
    bullet: EntityId,
    direction: Direction,
    offset_degrees: f64,
    speed: f64,
) -> Result<(), EcsError> {
    manager
        .get_mut(bullet)?
        .ext_mut::<Movable>()?
        .set_velocity(velocity_towards(direction, offset_degrees, speed));
    Ok(())
}

/// Aim along `velocity`. A zero velocity aims right.
pub fn set_direction_from_velocity(
    manager: &mut EntityManager,
    bullet: EntityId,
    velocity: Vec2,
    speed: f64,
) -> Result<(), EcsError> {
    let aim = if velocity.is_zero() {
        Vec2::new(1.0, 0.0)
    } else {
        velocity.normalize()
    };
    manager
        .get_mut(bullet)?
        .ext_mut::<Movable>()?
        .set_velocity(aim * speed);
    Ok(())
}

fn update_bullet(
    manager: &mut EntityManager,
    id: EntityId,
    delta_time: f64,
    traveled: &mut f64,
    max_travel: f64,
) -> Result<(), EcsError> {
    let entity = manager.get_mut(id)?;
    let velocity = entity.ext::<Movable>()?.velocity();
    let positionable = entity.ext_mut::<Positionable>()?;
    let last = positionable.position();
    let next = last + velocity * delta_time;
    positionable.set_position(next);
    *traveled += distance(last, next);

    let hitbox = manager.get(id)?.ext::<Collidable>()?.hitbox(next);
    let victim = manager
        .nearby_intersecting_destructibles(id, hitbox)
        .into_iter()
        .find(|candidate| {
            manager
                .entity(*candidate)
                .and_then(Entity::group)
                .is_some_and(|g| g == Group::Enemy)
        });

    if let Some(victim) = victim {
        manager.mark_entity_for_removal(id);
        manager.damage(victim, BULLET_DAMAGE);
        if manager.entity(victim).map(Entity::entity_type) == Some(EntityType::Zombie) {
            manager.broadcast(GameEvent::ZombieHurt { zombie_id: victim });
        }
        return Ok(());
    }

    if *traveled >= max_travel {
        manager.mark_entity_for_removal(id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> Tuning {
        Tuning::default()
    }

    fn target(m: &mut EntityManager, ty: EntityType, group: Group, at: Vec2) -> EntityId {
        m.spawn(ty, |e| {
            e.with(Positionable::new(Vec2::new(16.0, 16.0)).at(at))
                .with(Destructible::new(3))
                .with(Groupable::new(group))
        })
    }

    #[test]
    fn removed_once_travel_cap_reached() {
        let mut m = EntityManager::new(EventLog::new(), 0);
        let id = spawn_bullet(&mut m, Vec2::ZERO, Vec2::new(100.0, 0.0), &tuning());
        for _ in 0..7 {
            m.update(0.5);
        }
        assert!(m.entity(id).is_some());
        m.update(0.5);
        assert!(m.entity(id).is_none());
    }

    #[test]
    fn hits_first_enemy_and_reports_zombie_hurt() {
        let log = EventLog::new();
        let mut m = EntityManager::new(log.clone(), 0);
        let zombie = target(&mut m, EntityType::Zombie, Group::Enemy, Vec2::new(10.0, -8.0));
        let id = spawn_bullet(&mut m, Vec2::ZERO, Vec2::new(100.0, 0.0), &tuning());
        m.update(0.1);
        assert!(m.entity(id).is_none());
        let health = m.entity(zombie).unwrap().ext::<Destructible>().unwrap().health();
        assert_eq!(health, 2);
        assert_eq!(
            log.events(),
            vec![GameEvent::ZombieHurt { zombie_id: zombie }]
        );
    }

    #[test]
    fn passes_through_friendlies() {
        let log = EventLog::new();
        let mut m = EntityManager::new(log.clone(), 0);
        let friend = target(&mut m, EntityType::Player, Group::Friendly, Vec2::new(5.0, -8.0));
        let id = spawn_bullet(&mut m, Vec2::ZERO, Vec2::new(100.0, 0.0), &tuning());
        m.update(0.1);
        assert!(m.entity(id).is_some());
        assert_eq!(m.entity(friend).unwrap().ext::<Destructible>().unwrap().health(), 3);
        assert!(log.is_empty());
    }

    #[test]
    fn spread_shots_rotate_about_facing() {
        let v = velocity_towards(Direction::Right, 10.0, 500.0);
        assert!((v.length() - 500.0).abs() < 1e-9);
        assert!(v.y > 0.0);
        let straight = velocity_towards(Direction::Right, 0.0, 500.0);
        assert_eq!(straight, Vec2::new(500.0, 0.0));
    }

    #[test]
    fn zero_velocity_aims_right() {
        let mut m = EntityManager::new(EventLog::new(), 0);
        let id = spawn_bullet(&mut m, Vec2::ZERO, Vec2::ZERO, &tuning());
        set_direction_from_velocity(&mut m, id, Vec2::ZERO, 500.0).unwrap();
        let v = m.entity(id).unwrap().ext::<Movable>().unwrap().velocity();
        assert_eq!(v, Vec2::new(500.0, 0.0));
    }
}
