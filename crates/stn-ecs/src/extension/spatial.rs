//! Position, velocity and hitbox extensions.

use crate::geometry::{Rect, Vec2};
use crate::snapshot::ExtensionRecord;

// ---------------------------------------------------------------------------
// Positionable
// ---------------------------------------------------------------------------

/// A top-left anchored point plus a size used for hitbox derivation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Positionable {
    position: Vec2,
    size: Vec2,
}

impl Positionable {
    pub fn new(size: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            size,
        }
    }

    /// Builder: place at `position`.
    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// `position + size / 2`.
    pub fn center_position(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Full footprint, used as the damage box of destructible entities.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin(self.position, self.size)
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Positionable {
            position: self.position,
            size: self.size,
        }
    }
}

// ---------------------------------------------------------------------------
// Movable
// ---------------------------------------------------------------------------

/// Velocity holder. Integration happens in whichever update callback owns
/// the entity's motion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Movable {
    velocity: Vec2,
}

impl Movable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Movable {
            velocity: self.velocity,
        }
    }
}

// ---------------------------------------------------------------------------
// Collidable
// ---------------------------------------------------------------------------

/// Solid footprint relative to the owner's position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collidable {
    offset: Vec2,
    size: Vec2,
}

impl Collidable {
    pub fn new(size: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            size,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Hitbox for an owner positioned at `origin`.
    pub fn hitbox(&self, origin: Vec2) -> Rect {
        Rect::from_origin(origin + self.offset, self.size)
    }

    pub fn serialize(&self) -> ExtensionRecord {
        ExtensionRecord::Collidable {
            offset: self.offset,
            size: self.size,
        }
    }
}
