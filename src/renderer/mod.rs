//! Rendering module
//!
//! The loop driver hands a renderer one read-only [`Snapshot`] per frame.
//! The terminal implementation draws it with crossterm.

pub mod terminal;

pub use terminal::TerminalRenderer;

use crate::error::Result;
use crate::sim::Snapshot;

/// Draws a frame of the game
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot<'_>) -> Result<()>;
}
