//! STN Engine -- the survival game built on [`stn_ecs`].
//!
//! This crate supplies the concrete entity assemblies (player, zombie,
//! bullet, wall, ammo, bandage, fire), the fixed-timestep [`GameLoop`]
//! that drives the entity manager and produces one wire snapshot per tick,
//! JSON configuration, tracing setup and hashed engine snapshots.
//!
//! # Quick Start
//!
//! ```
//! use stn_engine::prelude::*;
//!
//! let mut game = GameLoop::from_config(GameConfig::default());
//! game.spawn_player(Vec2::new(0.0, 0.0));
//! game.spawn_zombie(Vec2::new(120.0, 0.0));
//!
//! let snapshot = game.run_ticks(30).unwrap();
//! assert_eq!(snapshot.tick, 30);
//! assert!(snapshot.is_consistent());
//!
//! // The wire payload is the bare entity list.
//! let payload = snapshot.payload();
//! assert_eq!(payload[0]["type"], "player");
//! ```
//!
//! [`GameLoop`]: tick::GameLoop

#![deny(unsafe_code)]

pub mod config;
pub mod entities;
pub mod logging;
pub mod snapshot;
pub mod tick;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use stn_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use stn_ecs::prelude::*;

    pub use crate::config::{ConfigError, GameConfig, TickConfig, Tuning};
    pub use crate::entities::spawn_item;
    pub use crate::logging::init_tracing;
    pub use crate::snapshot::EngineSnapshot;
    pub use crate::tick::{GameLoop, TickDiagnostics};
}
