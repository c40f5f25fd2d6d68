//! Simulation module
//!
//! All gameplay logic lives here. This module is pure and deterministic:
//! - State advances only through [`tick`]
//! - Stable iteration order (generation order for invaders, spawn order for shots)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod entity;
pub mod state;
pub mod tick;
pub mod wave;

pub use collision::{Hits, first_ship_contact, intersects, invader_reaches_ship, resolve_hits};
pub use entity::{Body, Direction, Movement, Rect};
pub use state::{
    GameEvent, GamePhase, GameState, Invader, InvaderSkin, Projectile, Ship, Snapshot,
};
pub use tick::{TickInput, tick};
pub use wave::{WaveLayout, generate_wave, layout_for};
