//! Engine-level snapshots with BLAKE3 hashing.
//!
//! An [`EngineSnapshot`] records the serialized world together with the tick
//! metadata and a content hash. Behaviour closures cannot be serialized, so a
//! snapshot cannot be restored into a running loop. It is used to persist
//! and compare simulation state: two runs with the same seed and inputs must
//! capture identical hashes at the same tick.
//!
//! ```
//! use stn_engine::prelude::*;
//!
//! let mut game = GameLoop::from_config(GameConfig::default());
//! game.spawn_zombie(Vec2::new(10.0, 10.0));
//! game.run_ticks(5);
//!
//! let snapshot = game.capture_snapshot();
//! assert_eq!(snapshot.tick_counter, 5);
//! assert_eq!(snapshot.hash.len(), 64);
//!
//! let json = snapshot.to_json().unwrap();
//! let back = EngineSnapshot::from_json(&json).unwrap();
//! game.verify_snapshot(&back).unwrap();
//! ```

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use stn_ecs::prelude::WorldSnapshot;

use crate::tick::GameLoop;

// ---------------------------------------------------------------------------
// EngineSnapshot
// ---------------------------------------------------------------------------

/// A serializable record of the engine state at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Every live entity, with its own entity-list hash.
    pub world: WorldSnapshot,
    /// Ticks executed at the time of capture.
    pub tick_counter: u64,
    pub fixed_dt: f64,
    /// Seed the world's generator was created with.
    pub seed: u64,
    /// BLAKE3 hex digest of everything above.
    pub hash: String,
}

impl EngineSnapshot {
    /// Check both the entity-list hash and the outer hash.
    ///
    /// # Errors
    ///
    /// Returns an error naming the mismatched digest when either hash does
    /// not match its recomputed value.
    pub fn verify(&self) -> anyhow::Result<()> {
        if !self.world.is_consistent() {
            return Err(anyhow!(
                "world hash mismatch at tick {}: the entity list may be corrupted",
                self.tick_counter
            ));
        }
        let expected = compute_hash(&self.world, self.tick_counter, self.fixed_dt, self.seed);
        if expected != self.hash {
            return Err(anyhow!(
                "snapshot hash mismatch: recorded {} but recomputed {}. \
                 The snapshot may be corrupted or tampered with.",
                self.hash,
                expected
            ));
        }
        Ok(())
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("failed to serialize engine snapshot")
    }

    /// Parse and [`verify`](Self::verify) a snapshot.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let snapshot: EngineSnapshot =
            serde_json::from_str(json).context("failed to parse engine snapshot")?;
        snapshot.verify()?;
        Ok(snapshot)
    }
}

fn compute_hash(world: &WorldSnapshot, tick_counter: u64, fixed_dt: f64, seed: u64) -> String {
    #[derive(Serialize)]
    struct HashableState<'a> {
        world: &'a WorldSnapshot,
        tick_counter: u64,
        fixed_dt: f64,
        seed: u64,
    }

    let hashable = HashableState {
        world,
        tick_counter,
        fixed_dt,
        seed,
    };
    let json_bytes = serde_json::to_vec(&hashable)
        .expect("EngineSnapshot state should always be JSON-serializable");
    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// GameLoop snapshot methods
// ---------------------------------------------------------------------------

impl GameLoop {
    pub fn capture_snapshot(&self) -> EngineSnapshot {
        let world = self.manager().snapshot(self.tick_count());
        let tick_counter = self.tick_count();
        let fixed_dt = self.fixed_dt();
        let seed = self.config().seed;
        let hash = compute_hash(&world, tick_counter, fixed_dt, seed);
        EngineSnapshot {
            world,
            tick_counter,
            fixed_dt,
            seed,
            hash,
        }
    }

    /// Check that this loop's current state matches `snapshot`.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot does not verify, was taken at a different tick,
    /// or its entity list differs from the live one.
    pub fn verify_snapshot(&self, snapshot: &EngineSnapshot) -> anyhow::Result<()> {
        snapshot.verify()?;
        if snapshot.tick_counter != self.tick_count() {
            return Err(anyhow!(
                "snapshot is from tick {} but the loop is at tick {}",
                snapshot.tick_counter,
                self.tick_count()
            ));
        }
        let live = self.state_hash();
        if live != snapshot.world.hash {
            return Err(anyhow!(
                "world diverged at tick {}: snapshot {} vs live {}",
                snapshot.tick_counter,
                snapshot.world.hash,
                live
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use stn_ecs::prelude::*;

    fn game() -> GameLoop {
        let mut game = GameLoop::from_config(GameConfig::default());
        game.spawn_player(Vec2::ZERO);
        game.spawn_zombie(Vec2::new(80.0, 40.0));
        game
    }

    #[test]
    fn fresh_snapshot_verifies() {
        let mut game = game();
        game.run_ticks(3);
        let snapshot = game.capture_snapshot();
        snapshot.verify().unwrap();
        game.verify_snapshot(&snapshot).unwrap();
    }

    #[test]
    fn tampered_entity_list_is_rejected() {
        let mut snapshot = game().capture_snapshot();
        snapshot.world.entities.pop();
        let err = snapshot.verify().unwrap_err();
        assert!(err.to_string().contains("world hash mismatch"));
    }

    #[test]
    fn tampered_metadata_is_rejected() {
        let mut snapshot = game().capture_snapshot();
        snapshot.seed += 1;
        let err = snapshot.verify().unwrap_err();
        assert!(err.to_string().contains("snapshot hash mismatch"));
    }

    #[test]
    fn diverged_loop_is_detected() {
        let mut game = game();
        let snapshot = game.capture_snapshot();
        game.tick();
        assert!(game.verify_snapshot(&snapshot).is_err());
    }

    #[test]
    fn json_round_trip_keeps_hash() {
        let snapshot = game().capture_snapshot();
        let back = EngineSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn garbage_json_is_an_error() {
        let err = EngineSnapshot::from_json("{not json").unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse engine snapshot"));
    }
}
