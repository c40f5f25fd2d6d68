//! Game tuning and player preferences
//!
//! Loaded once at startup from an optional JSON file. Every field falls back
//! to its default, so a settings file only needs the values it changes.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{GameError, Result};

/// Every tunable of the simulation
///
/// Fixed for the lifetime of a [`crate::sim::GameState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === World ===
    pub tile: f32,
    pub world_columns: u32,
    pub world_rows: u32,

    // === Ship ===
    pub ship_width: f32,
    pub ship_height: f32,
    /// Pixels moved per step command
    pub ship_step: f32,

    // === Invaders ===
    pub invader_width: f32,
    pub invader_height: f32,
    pub invader_speed: f32,
    pub invader_drop: f32,

    // === Wave layout ===
    pub wave_rows: u32,
    pub wave_columns: u32,
    pub wave_margin_x: f32,
    pub wave_margin_top: f32,
    pub wave_spacing_x: f32,
    pub wave_spacing_y: f32,
    pub wave_safe_rows: u32,

    // === Animation ===
    pub frame_duration_base: f32,
    pub frame_duration_step: f32,
    pub frame_duration_min: f32,

    // === Projectiles ===
    pub projectile_width: f32,
    pub projectile_height: f32,
    pub projectile_speed: f32,
    /// Seconds between honored fire requests
    pub fire_cooldown: f64,

    // === Rules ===
    pub score_per_kill: u64,
    pub starting_lives: u32,

    // === Loop ===
    pub max_frame_dt: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile: TILE,
            world_columns: WORLD_COLUMNS,
            world_rows: WORLD_ROWS,

            ship_width: SHIP_WIDTH,
            ship_height: SHIP_HEIGHT,
            ship_step: SHIP_STEP,

            invader_width: INVADER_WIDTH,
            invader_height: INVADER_HEIGHT,
            invader_speed: INVADER_SPEED,
            invader_drop: INVADER_DROP,

            wave_rows: WAVE_ROWS,
            wave_columns: WAVE_COLUMNS,
            wave_margin_x: WAVE_MARGIN_X,
            wave_margin_top: WAVE_MARGIN_TOP,
            wave_spacing_x: WAVE_SPACING_X,
            wave_spacing_y: WAVE_SPACING_Y,
            wave_safe_rows: WAVE_SAFE_ROWS,

            frame_duration_base: FRAME_DURATION_BASE,
            frame_duration_step: FRAME_DURATION_STEP,
            frame_duration_min: FRAME_DURATION_MIN,

            projectile_width: PROJECTILE_WIDTH,
            projectile_height: PROJECTILE_HEIGHT,
            projectile_speed: PROJECTILE_SPEED,
            fire_cooldown: FIRE_COOLDOWN,

            score_per_kill: SCORE_PER_KILL,
            starting_lives: STARTING_LIVES,

            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl GameConfig {
    /// World size in pixels
    pub fn world(&self) -> Vec2 {
        Vec2::new(
            self.tile * self.world_columns as f32,
            self.tile * self.world_rows as f32,
        )
    }

    pub fn ship_size(&self) -> Vec2 {
        Vec2::new(self.ship_width, self.ship_height)
    }

    /// Canonical ship position: horizontally centered, one tile above the floor
    pub fn ship_start(&self) -> Vec2 {
        let world = self.world();
        Vec2::new(
            world.x / 2.0 - self.ship_width / 2.0,
            world.y - self.ship_height - self.tile,
        )
    }

    pub fn invader_size(&self) -> Vec2 {
        Vec2::new(self.invader_width, self.invader_height)
    }

    pub fn projectile_size(&self) -> Vec2 {
        Vec2::new(self.projectile_width, self.projectile_height)
    }

    /// Seconds per animation frame at `level` (1-based), floored at the minimum
    pub fn frame_duration(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        (self.frame_duration_base - steps * self.frame_duration_step)
            .max(self.frame_duration_min)
    }
}

/// Audio preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
        }
    }
}

/// Everything read from the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameConfig,
    pub audio: AudioSettings,
}

impl Settings {
    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from `path` when given, otherwise use the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }
}
