//! Wave generation
//!
//! A wave is a rectangular grid that grows by one row and one column per
//! level and animates faster as the level rises.

use glam::Vec2;

use super::state::{Invader, InvaderSkin};
use crate::settings::GameConfig;

/// Grid dimensions for one wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveLayout {
    pub rows: u32,
    pub cols: u32,
}

impl WaveLayout {
    pub fn len(&self) -> usize {
        (self.rows * self.cols) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Most columns that fit between the side margins
pub fn max_columns(config: &GameConfig) -> u32 {
    let usable = config.world().x - 2.0 * config.wave_margin_x - config.invader_width;
    if usable < 0.0 || config.wave_spacing_x <= 0.0 {
        return 1;
    }
    (usable / config.wave_spacing_x).floor() as u32 + 1
}

/// Most rows that keep the grid bottom `wave_safe_rows` tiles above the ship
pub fn max_rows(config: &GameConfig) -> u32 {
    let floor = config.ship_start().y - config.wave_safe_rows as f32 * config.tile;
    let usable = floor - config.wave_margin_top - config.invader_height;
    if usable < 0.0 || config.wave_spacing_y <= 0.0 {
        return 1;
    }
    (usable / config.wave_spacing_y).floor() as u32 + 1
}

/// Rows and columns for `level` (1-based), capped to stay on screen
pub fn layout_for(config: &GameConfig, level: u32) -> WaveLayout {
    let growth = level.saturating_sub(1);
    let rows = config.wave_rows.saturating_add(growth);
    let cols = config.wave_columns.saturating_add(growth);
    let capped = WaveLayout {
        rows: rows.min(max_rows(config)),
        cols: cols.min(max_columns(config)),
    };
    if capped.rows != rows || capped.cols != cols {
        log::debug!(
            "Level {} grid {}x{} capped to {}x{}",
            level,
            rows,
            cols,
            capped.rows,
            capped.cols
        );
    }
    capped
}

/// Build the invader grid for `level`, in row-major order
pub fn generate_wave(config: &GameConfig, level: u32) -> Vec<Invader> {
    let layout = layout_for(config, level);
    let frame_duration = config.frame_duration(level);

    let mut invaders = Vec::with_capacity(layout.len());
    for row in 0..layout.rows {
        let skin = InvaderSkin::for_row(row);
        for col in 0..layout.cols {
            let pos = Vec2::new(
                config.wave_margin_x + col as f32 * config.wave_spacing_x,
                config.wave_margin_top + row as f32 * config.wave_spacing_y,
            );
            invaders.push(Invader::new(pos, config, skin, frame_duration));
        }
    }

    log::info!(
        "Wave for level {}: {}x{} invaders, {:.2}s/frame",
        level,
        layout.rows,
        layout.cols,
        frame_duration
    );
    invaders
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_layout() {
        let config = GameConfig::default();
        let wave = generate_wave(&config, 1);
        assert_eq!(wave.len(), 50);
        assert_eq!(wave[0].body.pos, Vec2::new(32.0, 64.0));
        // Last of the first row
        assert_eq!(wave[9].body.pos, Vec2::new(32.0 + 9.0 * 64.0, 64.0));
        // First of the second row
        assert_eq!(wave[10].body.pos, Vec2::new(32.0, 64.0 + 48.0));
    }

    #[test]
    fn test_grid_grows_with_level() {
        let config = GameConfig::default();
        for level in 1..=5 {
            let layout = layout_for(&config, level);
            assert_eq!(layout.rows, 5 + level - 1);
            assert_eq!(layout.cols, 10 + level - 1);
            assert_eq!(generate_wave(&config, level).len(), layout.len());
        }
    }

    #[test]
    fn test_rows_get_round_robin_skins() {
        let config = GameConfig::default();
        let wave = generate_wave(&config, 1);
        let cols = 10;
        assert_eq!(wave[0].skin, InvaderSkin::Green);
        assert_eq!(wave[cols].skin, InvaderSkin::Cyan);
        assert_eq!(wave[2 * cols].skin, InvaderSkin::Magenta);
        assert_eq!(wave[3 * cols].skin, InvaderSkin::Yellow);
        assert_eq!(wave[4 * cols].skin, InvaderSkin::Green);
        assert!(wave[..cols].iter().all(|i| i.skin == InvaderSkin::Green));
    }

    #[test]
    fn test_animation_speeds_up_with_level() {
        let config = GameConfig::default();
        let slow = generate_wave(&config, 1)[0].frame_duration();
        let fast = generate_wave(&config, 4)[0].frame_duration();
        assert!(fast < slow);
        let floor = generate_wave(&config, 30)[0].frame_duration();
        assert_eq!(floor, config.frame_duration_min);
    }

    #[test]
    fn test_caps_keep_grid_on_screen() {
        let config = GameConfig::default();
        assert_eq!(max_columns(&config), 15);
        assert_eq!(max_rows(&config), 16);

        let layout = layout_for(&config, 40);
        assert_eq!(layout.cols, 15);
        assert_eq!(layout.rows, 16);

        let wave = generate_wave(&config, 40);
        let world = config.world();
        let ship_top = config.ship_start().y;
        for invader in &wave {
            let b = invader.bounds();
            assert!(b.left() >= 0.0 && b.right() <= world.x);
            assert!(b.bottom() < ship_top);
        }
    }

    #[test]
    fn test_extreme_levels_stay_capped() {
        let mut config = GameConfig::default();
        let layout = layout_for(&config, u32::MAX);
        assert_eq!(layout.cols, max_columns(&config));
        assert_eq!(layout.rows, max_rows(&config));

        config.wave_rows = u32::MAX - 1;
        config.wave_columns = u32::MAX - 1;
        let layout = layout_for(&config, 10);
        assert_eq!(layout.cols, max_columns(&config));
        assert_eq!(layout.rows, max_rows(&config));
    }
}
