//! Game state and core simulation types
//!
//! All mutable simulation state lives in [`GameState`]; renderers only ever
//! see it through a borrowed [`Snapshot`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Direction, Movement, Rect};
use super::wave::generate_wave;
use crate::consts::INVADER_FRAMES;
use crate::settings::GameConfig;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended, simulation frozen
    GameOver,
}

/// Things that happened during a tick, for audio and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A fire command produced a projectile
    ShotFired,
    /// A projectile destroyed an invader
    InvaderDestroyed,
    /// An invader reached the ship and a life was lost
    ShipHit,
    /// The wave was cleared; `level` is the new level
    LevelCleared { level: u32 },
    /// The last life was lost
    GameOver,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub body: Body,
    /// Pixels per step command
    step_px: f32,
}

impl Ship {
    /// A ship at its canonical start position
    pub fn new(config: &GameConfig) -> Self {
        Self {
            body: Body::new(config.ship_start(), config.ship_size(), config.world()),
            step_px: config.ship_step,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    /// Top-left corner for a projectile of `size` leaving the nose of the ship
    pub fn muzzle(&self, size: Vec2) -> Vec2 {
        let b = self.bounds();
        Vec2::new(b.x + b.w / 2.0 - size.x / 2.0, b.y - size.y)
    }
}

impl Movement for Ship {
    fn step(&mut self, direction: Direction) {
        self.body.pos.x += direction.sign() * self.step_px;
        self.body.clamp_to_world();
    }
}

/// Invader color variants, assigned round-robin per wave row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvaderSkin {
    Green,
    Cyan,
    Magenta,
    Yellow,
}

impl InvaderSkin {
    pub const ALL: [InvaderSkin; 4] = [
        InvaderSkin::Green,
        InvaderSkin::Cyan,
        InvaderSkin::Magenta,
        InvaderSkin::Yellow,
    ];

    /// Skin for a wave row
    pub fn for_row(row: u32) -> Self {
        Self::ALL[row as usize % Self::ALL.len()]
    }

    /// Sprite paths (relative to the asset root) of the animation frames
    pub fn frame_paths(&self) -> [&'static str; INVADER_FRAMES] {
        match self {
            InvaderSkin::Green => ["sprites/alien.txt", "sprites/alien1.txt"],
            InvaderSkin::Cyan => ["sprites/alien-cyan.txt", "sprites/alien-cyan1.txt"],
            InvaderSkin::Magenta => ["sprites/alien-magenta.txt", "sprites/alien-magenta1.txt"],
            InvaderSkin::Yellow => ["sprites/alien-yellow.txt", "sprites/alien-yellow1.txt"],
        }
    }
}

/// A member of the invader wave
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invader {
    pub body: Body,
    pub skin: InvaderSkin,
    /// +1 sweeping right, -1 sweeping left
    dir: f32,
    speed: f32,
    drop: f32,
    frame_index: usize,
    frame_timer: f32,
    frame_duration: f32,
}

impl Invader {
    pub fn new(pos: Vec2, config: &GameConfig, skin: InvaderSkin, frame_duration: f32) -> Self {
        Self {
            body: Body::new(pos, config.invader_size(), config.world()),
            skin,
            dir: 1.0,
            speed: config.invader_speed,
            drop: config.invader_drop,
            frame_index: 0,
            frame_timer: 0.0,
            frame_duration,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    pub fn direction(&self) -> Direction {
        if self.dir < 0.0 {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    /// Current animation frame
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn frame_duration(&self) -> f32 {
        self.frame_duration
    }

    /// Touching or past the world edge it is moving toward
    pub fn at_edge(&self) -> bool {
        let x = self.body.pos.x;
        (self.dir < 0.0 && x <= 0.0) || (self.dir > 0.0 && x >= self.body.max_pos().x)
    }

    /// How far past the edge it is moving toward (0 when inside)
    pub fn overshoot(&self) -> f32 {
        let x = self.body.pos.x;
        if self.dir < 0.0 {
            (-x).max(0.0)
        } else {
            (x - self.body.max_pos().x).max(0.0)
        }
    }

    pub fn reverse(&mut self) {
        self.dir = -self.dir;
    }

    /// Vertical descent applied on a wave reversal (never clamped)
    pub fn drop_row(&mut self) {
        self.body.pos.y += self.drop;
    }
}

impl Movement for Invader {
    fn update(&mut self, dt: f32) {
        self.body.pos.x += self.dir * self.speed * dt;

        if INVADER_FRAMES > 1 && self.frame_duration > 0.0 {
            self.frame_timer += dt;
            while self.frame_timer >= self.frame_duration {
                self.frame_timer -= self.frame_duration;
                self.frame_index = (self.frame_index + 1) % INVADER_FRAMES;
            }
        }
    }
}

/// A shot travelling vertically
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Body,
    /// Pixels/s, negative = upward
    velocity: f32,
}

impl Projectile {
    pub fn new(pos: Vec2, size: Vec2, world: Vec2, velocity: f32) -> Self {
        Self {
            body: Body::new(pos, size, world),
            velocity,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Fully above the top edge or below the bottom edge
    pub fn is_off_screen(&self) -> bool {
        let b = self.bounds();
        b.bottom() < 0.0 || b.top() > self.body.world().y
    }
}

impl Movement for Projectile {
    fn update(&mut self, dt: f32) {
        // Not clamped so the shot can leave the screen
        self.body.pos.y += self.velocity * dt;
    }
}

/// Read-only view handed to the renderer once per frame
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub ship: &'a Ship,
    pub invaders: &'a [Invader],
    pub projectiles: &'a [Projectile],
    pub lives: u32,
    pub score: u64,
    pub level: u32,
    pub game_over: bool,
    pub world: Vec2,
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub lives: u32,
    pub score: u64,
    /// 1-based
    pub level: u32,
    pub ship: Ship,
    /// Kept in generation order (row-major)
    pub invaders: Vec<Invader>,
    pub projectiles: Vec<Projectile>,
    /// Simulated frames so far
    pub time_ticks: u64,
}

impl GameState {
    /// A fresh session at level 1
    pub fn new(config: GameConfig) -> Self {
        let invaders = generate_wave(&config, 1);
        Self {
            phase: GamePhase::Playing,
            lives: config.starting_lives,
            score: 0,
            level: 1,
            ship: Ship::new(&config),
            invaders,
            projectiles: Vec::new(),
            time_ticks: 0,
            config,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Spawn a projectile at the ship's nose
    pub fn spawn_projectile(&mut self) {
        let size = self.config.projectile_size();
        let pos = self.ship.muzzle(size);
        self.projectiles.push(Projectile::new(
            pos,
            size,
            self.config.world(),
            self.config.projectile_speed,
        ));
    }

    /// Replace the ship with a new one at the start position
    pub fn reset_ship(&mut self) {
        self.ship = Ship::new(&self.config);
    }

    /// Replace the wave with a fresh one for the current level
    pub fn regenerate_wave(&mut self) {
        self.invaders = generate_wave(&self.config, self.level);
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            ship: &self.ship,
            invaders: &self.invaders,
            projectiles: &self.projectiles,
            lives: self.lives,
            score: self.score,
            level: self.level,
            game_over: self.is_game_over(),
            world: self.config.world(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(config());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.invaders.len(), 50);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.ship.body.pos, Vec2::new(480.0, 960.0));
    }

    #[test]
    fn test_ship_update_is_noop() {
        let mut ship = Ship::new(&config());
        let before = ship.body.pos;
        ship.update(10.0);
        assert_eq!(ship.body.pos, before);
    }

    #[test]
    fn test_ship_step_moves_half_tile() {
        let mut ship = Ship::new(&config());
        ship.step(Direction::Left);
        assert_eq!(ship.body.pos.x, 464.0);
        ship.step(Direction::Right);
        ship.step(Direction::Right);
        assert_eq!(ship.body.pos.x, 496.0);
        ship.step(Direction::Still);
        assert_eq!(ship.body.pos.x, 496.0);
    }

    #[test]
    fn test_ship_step_into_wall_is_noop() {
        let mut ship = Ship::new(&config());
        ship.body.pos.x = 0.0;
        ship.step(Direction::Left);
        assert_eq!(ship.body.pos.x, 0.0);

        ship.body.pos.x = 960.0;
        ship.step(Direction::Right);
        assert_eq!(ship.body.pos.x, 960.0);
    }

    #[test]
    fn test_invader_and_projectile_step_are_noops() {
        let cfg = config();
        let mut invader = Invader::new(Vec2::new(100.0, 100.0), &cfg, InvaderSkin::Green, 0.15);
        invader.step(Direction::Right);
        assert_eq!(invader.body.pos, Vec2::new(100.0, 100.0));

        let mut shot = Projectile::new(Vec2::new(5.0, 5.0), cfg.projectile_size(), cfg.world(), -480.0);
        shot.step(Direction::Left);
        assert_eq!(shot.body.pos, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_invader_sweeps_and_animates() {
        let cfg = config();
        let mut invader = Invader::new(Vec2::new(100.0, 100.0), &cfg, InvaderSkin::Cyan, 0.25);
        invader.update(0.5);
        assert_eq!(invader.body.pos, Vec2::new(130.0, 100.0));
        // Two frame durations elapsed: back to frame 0
        assert_eq!(invader.frame_index(), 0);
        invader.update(0.25);
        assert_eq!(invader.frame_index(), 1);
    }

    #[test]
    fn test_invader_edge_is_directional() {
        let cfg = config();
        let mut invader = Invader::new(Vec2::new(992.0, 100.0), &cfg, InvaderSkin::Green, 0.15);
        assert!(invader.at_edge());
        invader.reverse();
        // Still touching the right wall, but moving away from it
        assert!(!invader.at_edge());
        invader.body.pos.x = 0.0;
        assert!(invader.at_edge());
    }

    #[test]
    fn test_muzzle_centers_projectile_above_ship() {
        let cfg = config();
        let ship = Ship::new(&cfg);
        let muzzle = ship.muzzle(cfg.projectile_size());
        assert!((muzzle.x - (480.0 + 32.0 - 3.2)).abs() < 1e-4);
        assert!((muzzle.y - (960.0 - 25.6)).abs() < 1e-4);
    }

    #[test]
    fn test_skins_round_robin() {
        assert_eq!(InvaderSkin::for_row(0), InvaderSkin::Green);
        assert_eq!(InvaderSkin::for_row(3), InvaderSkin::Yellow);
        assert_eq!(InvaderSkin::for_row(4), InvaderSkin::Green);
    }

    proptest! {
        #[test]
        fn prop_ship_steps_stay_in_world(steps in prop::collection::vec(-1i32..=1, 0..200)) {
            let cfg = config();
            let mut ship = Ship::new(&cfg);
            for s in steps {
                ship.step(Direction::from_sign(s));
                let max = ship.body.max_pos();
                prop_assert!(ship.body.pos.x >= 0.0 && ship.body.pos.x <= max.x);
                prop_assert!(ship.body.pos.y >= 0.0 && ship.body.pos.y <= max.y);
            }
        }

        #[test]
        fn prop_projectile_off_screen_predicate(y in -100.0f32..1200.0) {
            let cfg = config();
            let shot = Projectile::new(Vec2::new(10.0, y), cfg.projectile_size(), cfg.world(), -480.0);
            let expected = y + cfg.projectile_height < 0.0 || y > cfg.world().y;
            prop_assert_eq!(shot.is_off_screen(), expected);
        }
    }
}
