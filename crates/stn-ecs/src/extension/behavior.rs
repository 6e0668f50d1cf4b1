//! Behaviour hooks: per-tick callbacks, faction tags, and player input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::geometry::{Direction, Vec2};
use crate::manager::EntityManager;
use crate::snapshot::ExtensionRecord;

/// Per-tick callback: `(manager, self_id, delta_time)`.
pub type UpdateFn = Box<dyn FnMut(&mut EntityManager, EntityId, f64)>;

// ---------------------------------------------------------------------------
// Updatable
// ---------------------------------------------------------------------------

/// Wraps an arbitrary per-tick callback supplied by the assembly function.
///
/// While the callback runs it is temporarily moved out of the extension, so
/// the owner stays fully visible to queries during its own update.
#[derive(Default)]
pub struct Updatable {
    callback: Option<UpdateFn>,
}

impl Updatable {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&mut EntityManager, EntityId, f64) + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    pub(crate) fn take_callback(&mut self) -> Option<UpdateFn> {
        self.callback.take()
    }

    pub(crate) fn restore_callback(&mut self, callback: UpdateFn) {
        if self.callback.is_none() {
            self.callback = Some(callback);
        }
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Updatable
    }
}

impl fmt::Debug for Updatable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updatable")
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Groupable
// ---------------------------------------------------------------------------

/// Faction used for friend/foe filtering in damage queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Friendly,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Groupable {
    group: Group,
}

impl Groupable {
    pub fn new(group: Group) -> Self {
        Self { group }
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn is(&self, group: Group) -> bool {
        self.group == group
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Groupable { group: self.group }
    }
}

// ---------------------------------------------------------------------------
// Input / Controllable
// ---------------------------------------------------------------------------

/// One frame of player input, produced outside the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Input {
    pub facing: Direction,
    /// 1-based inventory slot.
    pub selected_slot: u8,
    pub dx: f64,
    pub dy: f64,
    pub interact: bool,
    pub fire: bool,
    pub drop: bool,
    pub consume: bool,
}

impl Input {
    /// Requested movement direction, normalized. Zero when idle. A
    /// non-finite axis counts as no movement on that axis.
    pub fn movement(&self) -> Vec2 {
        Vec2::new(finite_or_zero(self.dx), finite_or_zero(self.dy)).normalize()
    }

    /// Copy with non-finite axes zeroed, so the input stays representable
    /// on the wire.
    pub fn sanitized(self) -> Self {
        Self {
            dx: finite_or_zero(self.dx),
            dy: finite_or_zero(self.dy),
            ..self
        }
    }

    /// Zero-based index of the selected slot. Slot `0` is treated as slot 1.
    pub fn slot_index(&self) -> usize {
        usize::from(self.selected_slot.max(1) - 1)
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

impl Default for Input {
    fn default() -> Self {
        Self {
            facing: Direction::default(),
            selected_slot: 1,
            dx: 0.0,
            dy: 0.0,
            interact: false,
            fire: false,
            drop: false,
            consume: false,
        }
    }
}

/// Holds the latest [`Input`] for a player-controlled entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Controllable {
    input: Input,
}

impl Controllable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> Input {
        self.input
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    /// Store the latest input. Non-finite movement axes are zeroed.
    pub fn set_input(&mut self, input: Input) {
        self.input = input.sanitized();
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Controllable { input: self.input }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_defaults_to_first_slot() {
        let input = Input::default();
        assert_eq!(input.selected_slot, 1);
        assert_eq!(input.slot_index(), 0);
        assert!(input.movement().is_zero());
    }

    #[test]
    fn non_finite_axes_do_not_move() {
        let input = Input {
            dx: f64::INFINITY,
            dy: f64::NAN,
            ..Input::default()
        };
        assert!(input.movement().is_zero());

        let input = Input {
            dx: f64::NEG_INFINITY,
            dy: 2.0,
            ..Input::default()
        };
        assert_eq!(input.movement(), Vec2::new(0.0, 1.0));

        let mut holder = Controllable::new();
        holder.set_input(input);
        assert_eq!((holder.input().dx, holder.input().dy), (0.0, 2.0));
    }

    #[test]
    fn input_uses_camel_case_on_the_wire() {
        let input: Input = serde_json::from_value(serde_json::json!({
            "facing": "up_left",
            "selectedSlot": 3,
            "dx": 1.0,
            "fire": true
        }))
        .unwrap();
        assert_eq!(input.facing, Direction::UpLeft);
        assert_eq!(input.slot_index(), 2);
        assert!(input.fire);
        assert!(!input.drop);
    }

    #[test]
    fn groupable_serializes_snake_case() {
        let json = serde_json::to_value(Groupable::new(Group::Enemy).serialize()).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "groupable", "group": "enemy" }));
    }
}
