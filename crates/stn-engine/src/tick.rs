//! Fixed-timestep game loop.
//!
//! The [`GameLoop`] owns the [`EntityManager`] and advances it by a constant
//! `fixed_dt`. Each tick:
//!
//! 1. Every live entity's per-tick extensions run in id order
//!    ([`EntityManager::update`]).
//! 2. Entities marked for removal during the tick are flushed.
//! 3. The tick counter advances and a [`WorldSnapshot`] of the surviving
//!    entities is produced for broadcast to clients.
//!
//! Inputs are applied between ticks with [`GameLoop::set_player_input`].
//! Given the same seed, the same spawns and the same inputs, two loops
//! produce identical snapshot hashes.
//!
//! # Example
//!
//! ```
//! use stn_engine::prelude::*;
//!
//! let mut game = GameLoop::from_config(GameConfig::default());
//! let player = game.spawn_player(Vec2::new(0.0, 0.0));
//! game.set_player_input(player, Input { dx: 1.0, ..Input::default() }).unwrap();
//!
//! let snapshot = game.tick();
//! assert_eq!(snapshot.tick, 1);
//! assert_eq!(snapshot.len(), 1);
//! assert_eq!(game.tick_count(), 1);
//! ```

use std::time::{Duration, Instant};

use stn_ecs::prelude::*;
use tracing::{debug, info};

use crate::config::{GameConfig, Tuning};
use crate::entities;

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Measurements from the last tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time for the whole tick (update, flush, snapshot).
    pub total_time: Duration,
    /// Live entities after the flush.
    pub entity_count: usize,
    /// Entities removed by the flush.
    pub removed: usize,
}

// ---------------------------------------------------------------------------
// GameLoop
// ---------------------------------------------------------------------------

/// The authoritative fixed-timestep simulation.
pub struct GameLoop {
    manager: EntityManager,
    tick_counter: u64,
    fixed_dt: f64,
    config: GameConfig,
    last_diagnostics: TickDiagnostics,
}

impl GameLoop {
    /// Wrap an existing manager.
    ///
    /// # Panics
    ///
    /// Panics if `config.tick.fixed_dt` is not positive and finite. Use
    /// [`GameConfig::validate`] to reject such configs up front.
    pub fn new(manager: EntityManager, config: GameConfig) -> Self {
        let fixed_dt = config.tick.fixed_dt;
        assert!(
            fixed_dt > 0.0 && fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            fixed_dt
        );
        Self {
            manager,
            tick_counter: 0,
            fixed_dt,
            config,
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// A fresh, empty world seeded from `config.seed` whose events go to the
    /// log.
    pub fn from_config(config: GameConfig) -> Self {
        Self::with_broadcaster(config, TracingBroadcaster)
    }

    /// A fresh, empty world seeded from `config.seed` whose events go to
    /// `broadcaster`.
    pub fn with_broadcaster(config: GameConfig, broadcaster: impl Broadcaster + 'static) -> Self {
        info!(seed = config.seed, fixed_dt = config.tick.fixed_dt, "starting game loop");
        Self::new(EntityManager::new(broadcaster, config.seed), config)
    }

    // -- spawning -----------------------------------------------------------

    pub fn spawn_player(&mut self, position: Vec2) -> EntityId {
        let tuning = self.config.tuning;
        entities::player::spawn_player(&mut self.manager, position, &tuning)
    }

    pub fn spawn_zombie(&mut self, position: Vec2) -> EntityId {
        let tuning = self.config.tuning;
        entities::zombie::spawn_zombie(&mut self.manager, position, &tuning)
    }

    pub fn spawn_wall(&mut self, position: Vec2) -> EntityId {
        entities::wall::spawn_wall(&mut self.manager, position, entities::wall::WALL_HEALTH)
    }

    pub fn spawn_fire(&mut self, position: Vec2) -> EntityId {
        let tuning = self.config.tuning;
        entities::fire::spawn_fire(&mut self.manager, position, &tuning)
    }

    /// Place an inventory item in the world. `None` for items with no world
    /// form.
    pub fn spawn_item(&mut self, item: &InventoryItem, position: Vec2) -> Option<EntityId> {
        entities::spawn_item(&mut self.manager, item, position)
    }

    // -- input --------------------------------------------------------------

    /// Replace the input a player will act on during the next tick.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] for an unknown id and
    /// [`EcsError::ExtensionNotFound`] if the entity is not controllable.
    pub fn set_player_input(&mut self, id: EntityId, input: Input) -> Result<(), EcsError> {
        self.manager
            .get_mut(id)?
            .ext_mut::<Controllable>()?
            .set_input(input);
        Ok(())
    }

    // -- stepping -----------------------------------------------------------

    /// Advance the simulation by one `fixed_dt` and snapshot the result.
    pub fn tick(&mut self) -> WorldSnapshot {
        let tick_start = Instant::now();

        let report = self.manager.update(self.fixed_dt);
        self.tick_counter += 1;
        let snapshot = self.manager.snapshot(self.tick_counter);

        self.last_diagnostics = TickDiagnostics {
            total_time: tick_start.elapsed(),
            entity_count: snapshot.len(),
            removed: report.removed,
        };
        debug!(
            tick = self.tick_counter,
            entities = snapshot.len(),
            removed = report.removed,
            "tick complete"
        );
        snapshot
    }

    /// Run `count` ticks and return the last snapshot, or `None` when
    /// `count` is zero.
    pub fn run_ticks(&mut self, count: u64) -> Option<WorldSnapshot> {
        let mut last = None;
        for _ in 0..count {
            last = Some(self.tick());
        }
        last
    }

    // -- accessors ----------------------------------------------------------

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulation time in seconds, computed as `tick_count * fixed_dt`.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn tuning(&self) -> &Tuning {
        &self.config.tuning
    }

    pub fn manager(&self) -> &EntityManager {
        &self.manager
    }

    /// Direct access for setup and tests.
    pub fn manager_mut(&mut self) -> &mut EntityManager {
        &mut self.manager
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    /// BLAKE3 hex digest of the current entity list.
    pub fn state_hash(&self) -> String {
        stn_ecs::snapshot::compute_hash(&self.manager.serialize_entities())
    }
}

impl std::fmt::Debug for GameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLoop")
            .field("tick_counter", &self.tick_counter)
            .field("fixed_dt", &self.fixed_dt)
            .field("entities", &self.manager.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
