//! The [`EntityManager`]: owner of the live entity set.
//!
//! The manager hands out ids, answers spatial queries, and drives the
//! per-tick pass over every [`Updatable`] and [`Ignitable`] extension.
//!
//! # Tick contract
//!
//! [`update`](EntityManager::update) snapshots the live ids, runs each
//! entity's per-tick extensions in id order, then flushes the removal queue.
//! Removals requested during the pass are deferred, so every callback in the
//! same tick sees the same population. Entities added during the pass are
//! visible to queries immediately but are first updated on the next tick.
//!
//! # Callbacks
//!
//! Callbacks receive `&mut EntityManager` and their owner's id. While a
//! callback runs it is moved out of its extension and put back afterwards,
//! so the owner remains in the live set and can be looked up like any other
//! entity.

use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::{debug, error, trace};

use crate::entity::{Entity, EntityId, EntityType};
use crate::event::{Broadcaster, GameEvent};
use crate::extension::{
    Destructible, ExtensionKind, Ignitable, Interactive, Positionable, Updatable,
};
use crate::geometry::{distance, Rect, Vec2};
use crate::removal::{FlushReport, RemovalQueue};
use crate::snapshot::{EntityRecord, WorldSnapshot};
use crate::EcsError;

/// Owns every live entity.
pub struct EntityManager {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
    removals: RemovalQueue,
    broadcaster: Box<dyn Broadcaster>,
    rng: Pcg32,
    last_flush: FlushReport,
}

impl EntityManager {
    /// An empty world emitting events to `broadcaster`, with all randomness
    /// drawn from `seed`.
    pub fn new(broadcaster: impl Broadcaster + 'static, seed: u64) -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
            removals: RemovalQueue::new(),
            broadcaster: Box::new(broadcaster),
            rng: Pcg32::seed_from_u64(seed),
            last_flush: FlushReport::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Reserve a fresh id. Ids increase monotonically and are never reused.
    pub fn generate_entity_id(&mut self) -> EntityId {
        let id = EntityId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a fully built entity.
    ///
    /// # Panics
    ///
    /// Panics if an entity with the same id is already live.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        assert!(
            !self.entities.contains_key(&id),
            "entity id {id} is already registered"
        );
        self.next_id = self.next_id.max(id.to_raw().saturating_add(1));
        trace!(entity = %id, entity_type = %entity.entity_type(), "entity added");
        self.entities.insert(id, entity);
        id
    }

    /// Allocate an id, let `build` attach extensions, and register the result.
    pub fn spawn(
        &mut self,
        entity_type: EntityType,
        build: impl FnOnce(Entity) -> Entity,
    ) -> EntityId {
        let id = self.generate_entity_id();
        self.add_entity(build(Entity::new(id, entity_type)))
    }

    /// Queue `id` for removal at the end of the current tick. Marking twice,
    /// or marking an unknown id, is a no-op. Returns whether it was newly
    /// queued.
    pub fn mark_entity_for_removal(&mut self, id: EntityId) -> bool {
        if !self.entities.contains_key(&id) {
            return false;
        }
        self.removals.mark(id)
    }

    pub fn is_marked_for_removal(&self, id: EntityId) -> bool {
        self.removals.contains(id)
    }

    /// Remove immediately, bypassing the queue. For setup and admin paths;
    /// tick logic should use [`mark_entity_for_removal`](Self::mark_entity_for_removal).
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Apply every queued removal in marking order.
    pub fn flush_removals(&mut self) -> FlushReport {
        let mut report = FlushReport::default();
        for id in self.removals.drain() {
            if self.entities.remove(&id).is_some() {
                report.removed += 1;
            } else {
                report.missing += 1;
            }
        }
        if report.removed > 0 || report.missing > 0 {
            debug!(
                removed = report.removed,
                missing = report.missing,
                "flushed pending removals"
            );
        }
        self.last_flush = report;
        report
    }

    /// Report from the most recent flush.
    pub fn last_flush_report(&self) -> FlushReport {
        self.last_flush
    }

    pub fn pending_removals(&self) -> usize {
        self.removals.len()
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// The live entity with `id`, or `None` once it has been removed.
    #[doc(alias = "get_entity_by_id")]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Like [`entity`](Self::entity) but fails with
    /// [`EcsError::EntityNotFound`].
    pub fn get(&self, id: EntityId) -> Result<&Entity, EcsError> {
        self.entities
            .get(&id)
            .ok_or(EcsError::EntityNotFound { entity: id })
    }

    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut Entity, EcsError> {
        self.entities
            .get_mut(&id)
            .ok_or(EcsError::EntityNotFound { entity: id })
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Live entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn entities_of_type(&self, entity_type: EntityType) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.entity_type() == entity_type)
            .map(Entity::id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // -----------------------------------------------------------------------
    // Spatial queries (brute-force scan)
    // -----------------------------------------------------------------------

    /// Positioned entities whose center lies within `radius` of `point`.
    pub fn nearby_entities(&self, point: Vec2, radius: f64) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| {
                e.center_position()
                    .is_some_and(|center| distance(center, point) <= radius)
            })
            .map(Entity::id)
            .collect()
    }

    /// Living destructible entities whose damage box overlaps `rect`,
    /// excluding `requester`.
    pub fn nearby_intersecting_destructibles(&self, requester: EntityId, rect: Rect) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.id() != requester)
            .filter(|e| e.try_ext::<Destructible>().is_some_and(|d| !d.is_dead()))
            .filter(|e| e.damage_box().is_some_and(|b| b.intersects(&rect)))
            .map(Entity::id)
            .collect()
    }

    /// First collidable entity overlapping `id`'s hitbox. Entities of
    /// `excluded` types and dead destructibles are ignored.
    pub fn colliding_entity(&self, id: EntityId, excluded: &[EntityType]) -> Option<EntityId> {
        let hitbox = self.entities.get(&id)?.hitbox()?;
        self.entities
            .values()
            .filter(|e| e.id() != id)
            .filter(|e| !excluded.contains(&e.entity_type()))
            .filter(|e| !e.is_dead())
            .find(|e| e.hitbox().is_some_and(|other| other.intersects(&hitbox)))
            .map(Entity::id)
    }

    pub fn is_colliding(&self, id: EntityId, excluded: &[EntityType]) -> bool {
        self.colliding_entity(id, excluded).is_some()
    }

    /// Every collidable entity overlapping `id`'s hitbox, under the same
    /// rules as [`colliding_entity`](Self::colliding_entity).
    pub fn colliding_entities(&self, id: EntityId, excluded: &[EntityType]) -> Vec<EntityId> {
        let Some(hitbox) = self.entities.get(&id).and_then(Entity::hitbox) else {
            return Vec::new();
        };
        self.entities
            .values()
            .filter(|e| e.id() != id)
            .filter(|e| !excluded.contains(&e.entity_type()))
            .filter(|e| !e.is_dead())
            .filter(|e| e.hitbox().is_some_and(|other| other.intersects(&hitbox)))
            .map(Entity::id)
            .collect()
    }

    /// Living collidable entities whose hitbox overlaps `rect`.
    pub fn collidables_in(&self, rect: Rect) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| !e.is_dead())
            .filter(|e| e.hitbox().is_some_and(|b| b.intersects(&rect)))
            .map(Entity::id)
            .collect()
    }

    /// Nearest entity (by center distance) within `radius` that matches
    /// `filter`, excluding `origin` itself.
    pub fn nearest_entity(
        &self,
        origin: EntityId,
        radius: f64,
        filter: impl Fn(&Entity) -> bool,
    ) -> Option<EntityId> {
        let center = self.entities.get(&origin)?.center_position()?;
        self.entities
            .values()
            .filter(|e| e.id() != origin && filter(e))
            .filter_map(|e| Some((e.id(), distance(e.center_position()?, center))))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one tick: every per-tick extension of every entity live at the
    /// start of the call, then the removal flush.
    pub fn update(&mut self, delta_time: f64) -> FlushReport {
        let ids = self.entity_ids();
        for id in ids {
            self.update_entity(id, delta_time);
        }
        self.flush_removals()
    }

    fn update_entity(&mut self, id: EntityId, delta_time: f64) {
        let kinds: Vec<ExtensionKind> = match self.entities.get(&id) {
            Some(entity) => entity
                .extension_kinds()
                .iter()
                .copied()
                .filter(|k| k.runs_per_tick())
                .collect(),
            None => return,
        };
        for kind in kinds {
            match kind {
                ExtensionKind::Updatable => self.run_updatable(id, delta_time),
                ExtensionKind::Ignitable => self.run_ignitable(id, delta_time),
                _ => {}
            }
        }
    }

    fn run_updatable(&mut self, id: EntityId, delta_time: f64) {
        let callback = self
            .entities
            .get_mut(&id)
            .and_then(|e| e.try_ext_mut::<Updatable>())
            .and_then(Updatable::take_callback);
        let Some(mut callback) = callback else {
            return;
        };
        callback(self, id, delta_time);
        if let Some(updatable) = self
            .entities
            .get_mut(&id)
            .and_then(|e| e.try_ext_mut::<Updatable>())
        {
            updatable.restore_callback(callback);
        }
    }

    fn run_ignitable(&mut self, id: EntityId, delta_time: f64) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if !entity.has_ext::<Destructible>() {
            error!(
                entity = %id,
                entity_type = %entity.entity_type(),
                "ignitable attached to an entity without destructible -- detaching"
            );
            entity.remove_extension(ExtensionKind::Ignitable);
            return;
        }
        let Some(burn) = entity
            .try_ext_mut::<Ignitable>()
            .and_then(|ig| ig.advance(delta_time))
        else {
            return;
        };

        self.damage(id, burn);

        if let Some(entity) = self.entities.get_mut(&id) {
            let spent = entity.try_ext_mut::<Ignitable>().is_some_and(|ig| {
                ig.record_damage(burn);
                ig.is_spent()
            });
            if spent {
                entity.remove_extension(ExtensionKind::Ignitable);
                debug!(entity = %id, "burn finished");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Health and interaction
    // -----------------------------------------------------------------------

    /// Damage a destructible entity. Runs its death handler if this call
    /// killed it. Returns `true` only in that case. Unknown ids, entities
    /// without [`Destructible`] and dead entities are no-ops.
    pub fn damage(&mut self, id: EntityId, amount: u32) -> bool {
        let Some(destructible) = self
            .entities
            .get_mut(&id)
            .and_then(|e| e.try_ext_mut::<Destructible>())
        else {
            return false;
        };
        if !destructible.damage(amount) {
            return false;
        }
        let handler = destructible.take_death_handler();
        debug!(entity = %id, "entity died");
        if let Some(handler) = handler {
            handler(self, id);
        }
        true
    }

    /// Heal a destructible entity. Returns whether it had a [`Destructible`].
    pub fn heal(&mut self, id: EntityId, amount: u32) -> bool {
        match self
            .entities
            .get_mut(&id)
            .and_then(|e| e.try_ext_mut::<Destructible>())
        {
            Some(destructible) => {
                destructible.heal(amount);
                true
            }
            None => false,
        }
    }

    /// Fire `target`'s interact handler on behalf of `actor`. Returns `false`
    /// when the target is gone or is not interactive.
    pub fn interact(&mut self, target: EntityId, actor: EntityId) -> bool {
        let handler = self
            .entities
            .get_mut(&target)
            .and_then(|e| e.try_ext_mut::<Interactive>())
            .and_then(Interactive::take_handler);
        let Some(mut handler) = handler else {
            debug!(target = %target, actor = %actor, "interact target missing or not interactive");
            return false;
        };
        handler(self, target, actor);
        if let Some(interactive) = self
            .entities
            .get_mut(&target)
            .and_then(|e| e.try_ext_mut::<Interactive>())
        {
            interactive.restore_handler(handler);
        }
        true
    }

    // -----------------------------------------------------------------------
    // Collaborators
    // -----------------------------------------------------------------------

    pub fn broadcaster(&mut self) -> &mut dyn Broadcaster {
        self.broadcaster.as_mut()
    }

    pub fn broadcast(&mut self, event: GameEvent) {
        self.broadcaster.broadcast_event(event);
    }

    /// Seeded generator for all simulation randomness.
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    pub fn serialize_entities(&self) -> Vec<EntityRecord> {
        self.entities.values().map(Entity::serialize).collect()
    }

    pub fn snapshot(&self, tick: u64) -> WorldSnapshot {
        WorldSnapshot::new(tick, self.serialize_entities())
    }

    /// Convenience for reading an entity's position, used heavily by
    /// assemblies.
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(&id)?.try_ext::<Positionable>().map(Positionable::position)
    }
}

impl fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityManager")
            .field("entities", &self.entities.len())
            .field("next_id", &self.next_id)
            .field("pending_removals", &self.removals.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
