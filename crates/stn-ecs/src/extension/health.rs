//! Health and damage-over-time extensions.

use std::fmt;

use crate::cooldown::Cooldown;
use crate::entity::EntityId;
use crate::manager::EntityManager;
use crate::snapshot::ExtensionRecord;

/// Invoked once, with manager access, when a [`Destructible`] first reaches
/// zero health.
pub type DeathHandler = Box<dyn FnOnce(&mut EntityManager, EntityId)>;

// ---------------------------------------------------------------------------
// Destructible
// ---------------------------------------------------------------------------

/// Health pool with an optional death handler.
///
/// Health never goes below zero; an entity is dead exactly when its health
/// is zero. Damage and heal are no-ops on a dead entity.
///
/// [`damage`](Self::damage) reports whether the call caused the death. The
/// handler itself is run by [`EntityManager::damage`], which needs the
/// manager to hand to it. The handler is consumed when it runs, so it fires
/// at most once per entity.
pub struct Destructible {
    health: u32,
    max_health: u32,
    death_handler: Option<DeathHandler>,
}

impl Destructible {
    /// Full health at `max_health`.
    pub fn new(max_health: u32) -> Self {
        Self {
            health: max_health,
            max_health,
            death_handler: None,
        }
    }

    /// Builder: start at `health` instead of full.
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health;
        self
    }

    /// Builder: attach the death handler.
    pub fn on_death<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(&mut EntityManager, EntityId) + 'static,
    {
        self.death_handler = Some(Box::new(handler));
        self
    }

    pub fn set_health(&mut self, health: u32) {
        self.health = health;
    }

    pub fn set_max_health(&mut self, max_health: u32) {
        self.max_health = max_health;
    }

    /// Subtract `amount`, saturating at zero. Returns `true` only for the
    /// call that takes a living entity to zero.
    pub fn damage(&mut self, amount: u32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        self.is_dead()
    }

    /// Add `amount`, clamped to `max_health`.
    pub fn heal(&mut self, amount: u32) {
        if self.is_dead() {
            return;
        }
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn has_death_handler(&self) -> bool {
        self.death_handler.is_some()
    }

    pub(crate) fn take_death_handler(&mut self) -> Option<DeathHandler> {
        self.death_handler.take()
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Destructible {
            health: self.health,
            max_health: self.max_health,
        }
    }
}

impl fmt::Debug for Destructible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destructible")
            .field("health", &self.health)
            .field("max_health", &self.max_health)
            .field("has_death_handler", &self.death_handler.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Ignitable
// ---------------------------------------------------------------------------

/// Burning: a transient damage-over-time effect.
///
/// Every `interval` seconds the owner's [`Destructible`] takes
/// `damage_per_burn`. Once the accumulated damage reaches `max_damage` the
/// manager detaches the extension from its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Ignitable {
    cooldown: Cooldown,
    damage_per_burn: u32,
    max_damage: u32,
    total_damage: u32,
}

impl Ignitable {
    pub const DEFAULT_INTERVAL: f64 = 1.0;
    pub const DEFAULT_MAX_DAMAGE: u32 = 2;

    pub fn new(max_damage: u32) -> Self {
        Self {
            cooldown: Cooldown::armed(Self::DEFAULT_INTERVAL),
            damage_per_burn: 1,
            max_damage,
            total_damage: 0,
        }
    }

    pub fn with_interval(mut self, seconds: f64) -> Self {
        self.cooldown = Cooldown::armed(seconds);
        self
    }

    pub fn with_damage(mut self, damage_per_burn: u32) -> Self {
        self.damage_per_burn = damage_per_burn;
        self
    }

    /// Advance the burn timer. Returns the damage to apply when it fires.
    pub fn advance(&mut self, delta_time: f64) -> Option<u32> {
        self.cooldown.update(delta_time);
        if !self.cooldown.is_ready() {
            return None;
        }
        self.cooldown.reset();
        Some(self.damage_per_burn)
    }

    pub fn record_damage(&mut self, amount: u32) {
        self.total_damage = self.total_damage.saturating_add(amount);
    }

    /// Whether the burn has dealt its full damage and should be removed.
    pub fn is_spent(&self) -> bool {
        self.total_damage >= self.max_damage
    }

    pub fn total_damage(&self) -> u32 {
        self.total_damage
    }

    pub fn max_damage(&self) -> u32 {
        self.max_damage
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Ignitable {
            total_damage: self.total_damage,
            max_damage: self.max_damage,
        }
    }
}

impl Default for Ignitable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DAMAGE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_past_zero_reports_death_once() {
        let mut d = Destructible::new(5);
        assert!(d.damage(5));
        assert!(!d.damage(3));
        assert_eq!(d.health(), 0);
        assert!(d.is_dead());
    }

    #[test]
    fn overkill_saturates_at_zero() {
        let mut d = Destructible::new(3);
        assert!(d.damage(10));
        assert_eq!(d.health(), 0);
    }

    #[test]
    fn heal_clamps_to_max() {
        let mut d = Destructible::new(1);
        d.set_max_health(10);
        d.set_health(8);
        d.heal(5);
        assert_eq!(d.health(), 10);
    }

    #[test]
    fn heal_on_dead_is_noop() {
        let mut d = Destructible::new(2);
        d.damage(2);
        d.heal(1);
        assert_eq!(d.health(), 0);
    }

    #[test]
    fn ignitable_fires_on_interval_until_spent() {
        let mut ig = Ignitable::new(2);
        assert_eq!(ig.advance(0.5), None);
        assert_eq!(ig.advance(0.5), Some(1));
        ig.record_damage(1);
        assert!(!ig.is_spent());
        assert_eq!(ig.advance(1.0), Some(1));
        ig.record_damage(1);
        assert!(ig.is_spent());
    }
}
