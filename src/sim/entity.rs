//! Entity geometry and the shared movement capability
//!
//! Every movable object is a [`Body`]: a top-left position, a fixed size and
//! the fixed world it lives in. Type-specific motion comes from [`Movement`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap test: boxes that only share an edge do not intersect
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// Discrete horizontal step direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Still,
    Right,
}

impl Direction {
    /// -1, 0 or +1
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Still => 0.0,
            Direction::Right => 1.0,
        }
    }

    /// Direction from the sign of an integer
    pub fn from_sign(sign: i32) -> Self {
        match sign.signum() {
            -1 => Direction::Left,
            1 => Direction::Right,
            _ => Direction::Still,
        }
    }
}

/// Position, size and world bounds of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    size: Vec2,
    world: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, world: Vec2) -> Self {
        Self { pos, size, world }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn world(&self) -> Vec2 {
        self.world
    }

    /// Largest legal top-left coordinate on each axis
    #[inline]
    pub fn max_pos(&self) -> Vec2 {
        self.world - self.size
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    /// Pull the position back inside `[0, world - size]` on both axes
    pub fn clamp_to_world(&mut self) {
        let max = self.max_pos();
        self.pos.x = self.pos.x.min(max.x).max(0.0);
        self.pos.y = self.pos.y.min(max.y).max(0.0);
    }
}

/// Movement shared by every entity
///
/// Both methods exist on every type so entities can be driven uniformly; a
/// type only overrides the one it actually uses.
pub trait Movement {
    /// One discrete horizontal step (input-driven)
    fn step(&mut self, _direction: Direction) {}

    /// Continuous, time-based motion over `dt` seconds
    fn update(&mut self, _dt: f32) {}
}
