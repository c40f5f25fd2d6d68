//! Space Invaders - a frame-driven arcade shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, waves, collisions, rules)
//! - `driver`: Frame clock and loop driver
//! - `input`: Key mapping, fire rate limiting and the demo autopilot
//! - `renderer`: Renderer seam and the terminal implementation
//! - `assets`: Sprite loading and caching
//! - `audio`: Sound effect / music seam
//! - `settings`: Data-driven game tuning and preferences

pub mod assets;
pub mod audio;
pub mod driver;
pub mod error;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::LoopDriver;
pub use error::{GameError, Result};
pub use settings::{AudioSettings, GameConfig, Settings};

/// Game configuration constants
///
/// These are the defaults behind [`GameConfig`]; the running game only ever
/// reads the config it was initialized with.
pub mod consts {
    /// Size of one world tile in pixels
    pub const TILE: f32 = 32.0;
    /// World dimensions in tiles
    pub const WORLD_COLUMNS: u32 = 32;
    pub const WORLD_ROWS: u32 = 32;

    /// Ship is two tiles wide, one tall, moved half a tile per key press
    pub const SHIP_WIDTH: f32 = TILE * 2.0;
    pub const SHIP_HEIGHT: f32 = TILE;
    pub const SHIP_STEP: f32 = TILE / 2.0;

    /// Invader defaults
    pub const INVADER_WIDTH: f32 = TILE;
    pub const INVADER_HEIGHT: f32 = TILE;
    /// Horizontal sweep speed (pixels/s)
    pub const INVADER_SPEED: f32 = 60.0;
    /// Vertical drop applied to the whole wave on every edge reversal
    pub const INVADER_DROP: f32 = 16.0;
    /// Sprite frames per invader skin
    pub const INVADER_FRAMES: usize = 2;

    /// Wave layout at level 1
    pub const WAVE_ROWS: u32 = 5;
    pub const WAVE_COLUMNS: u32 = 10;
    pub const WAVE_MARGIN_X: f32 = TILE;
    pub const WAVE_MARGIN_TOP: f32 = TILE * 2.0;
    pub const WAVE_SPACING_X: f32 = TILE * 2.0;
    pub const WAVE_SPACING_Y: f32 = TILE * 1.5;
    /// Tile rows kept free between the grid bottom and the ship
    pub const WAVE_SAFE_ROWS: u32 = 4;

    /// Animation speed: seconds per frame, shrinking with the level
    pub const FRAME_DURATION_BASE: f32 = 0.15;
    pub const FRAME_DURATION_STEP: f32 = 0.01;
    pub const FRAME_DURATION_MIN: f32 = 0.05;

    /// Projectile defaults
    pub const PROJECTILE_WIDTH: f32 = TILE * 0.2;
    pub const PROJECTILE_HEIGHT: f32 = TILE * 0.8;
    /// Negative = upward (pixels/s)
    pub const PROJECTILE_SPEED: f32 = -480.0;
    /// Minimum time between honored fire requests (seconds)
    pub const FIRE_COOLDOWN: f64 = 0.2;

    /// Rules
    pub const SCORE_PER_KILL: u64 = 10;
    pub const STARTING_LIVES: u32 = 3;

    /// Largest dt handed to the simulation after a host stall (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}
