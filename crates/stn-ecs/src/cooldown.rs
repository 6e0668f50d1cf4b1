//! Countdown timer shared by weapon fire, attacks and damage-over-time.

use serde::{Deserialize, Serialize};

/// A resettable countdown measured in seconds.
///
/// A fresh cooldown starts ready; call [`reset`](Self::reset) to arm it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    duration: f64,
    remaining: f64,
}

impl Cooldown {
    /// A cooldown of `duration` seconds that is ready immediately.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    /// A cooldown of `duration` seconds that must elapse before the first
    /// fire.
    pub fn armed(duration: f64) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }

    /// Advance by `delta_time` seconds.
    pub fn update(&mut self, delta_time: f64) {
        self.remaining -= delta_time;
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Re-arm for a full `duration`.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}
