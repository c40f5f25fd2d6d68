//! Keyboard input
//!
//! Raw key events become discrete commands here. Ship steps are emitted once
//! per press event; fire requests are rate-limited by a cooldown measured on
//! the host clock. The [`Autopilot`] produces the same key events a player
//! would, so demo mode goes through exactly the same path.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::{Direction, Snapshot};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    A,
    D,
    Space,
    R,
    Escape,
    Q,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Pressed,
        }
    }

    pub fn released(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Released,
        }
    }
}

/// What a key event asks the game to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Move the ship one step
    Step(Direction),
    /// Fire (cooldown already satisfied)
    Fire,
    /// Start a new session (only honored after game over)
    Restart,
    /// Leave the game (handled by the host)
    Quit,
}

/// Turns key events into commands
#[derive(Debug, Clone)]
pub struct InputMapper {
    /// Seconds between honored fire requests
    cooldown: f64,
    /// Host time of the last honored fire
    last_fire: Option<f64>,
}

impl InputMapper {
    pub fn new(cooldown: f64) -> Self {
        Self {
            cooldown,
            last_fire: None,
        }
    }

    /// Map one key event received at host time `now` (seconds)
    ///
    /// Only presses produce commands; releases are accepted and ignored.
    pub fn key_event(&mut self, event: KeyEvent, now: f64) -> Option<Command> {
        if event.action != KeyAction::Pressed {
            return None;
        }
        match event.key {
            Key::Left | Key::A => Some(Command::Step(Direction::Left)),
            Key::Right | Key::D => Some(Command::Step(Direction::Right)),
            Key::Space => self.try_fire(now),
            Key::R => Some(Command::Restart),
            Key::Escape | Key::Q => Some(Command::Quit),
            Key::Other => None,
        }
    }

    fn try_fire(&mut self, now: f64) -> Option<Command> {
        if let Some(last) = self.last_fire {
            if now - last < self.cooldown {
                log::trace!("Fire dropped, {:.3}s into cooldown", now - last);
                return None;
            }
        }
        self.last_fire = Some(now);
        Some(Command::Fire)
    }

    /// Forget the last shot so the next fire request is honored immediately
    pub fn reset_cooldown(&mut self) {
        self.last_fire = None;
    }

    /// Forget everything from the previous session
    pub fn reset(&mut self) {
        self.last_fire = None;
    }
}

/// Pixels of slack when lining the ship up under a target
const AIM_TOLERANCE: f32 = 12.0;
/// Seconds to linger on the game over screen before restarting
const RESTART_DELAY: f64 = 3.0;

/// Seeded demo player
///
/// Chases the lowest invader (nearest one horizontally on ties), with a
/// jittered aim point and reaction time so runs differ between seeds but
/// replay exactly for the same seed.
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    next_decision: f64,
    aim_offset: f32,
    game_over_since: Option<f64>,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_decision: 0.0,
            aim_offset: 0.0,
            game_over_since: None,
        }
    }

    /// Key events to inject at host time `now`
    pub fn poll(&mut self, now: f64, snapshot: &Snapshot<'_>) -> Vec<KeyEvent> {
        if snapshot.game_over {
            let since = *self.game_over_since.get_or_insert(now);
            if now - since >= RESTART_DELAY {
                self.game_over_since = None;
                self.next_decision = now;
                return vec![KeyEvent::pressed(Key::R), KeyEvent::released(Key::R)];
            }
            return Vec::new();
        }
        self.game_over_since = None;

        if now < self.next_decision {
            return Vec::new();
        }
        // Reaction time between decisions
        self.next_decision = now + self.rng.random_range(0.04..0.12);

        let ship = snapshot.ship.bounds();
        let ship_center = ship.x + ship.w / 2.0;

        let target = snapshot.invaders.iter().min_by(|a, b| {
            let (a, b) = (a.bounds(), b.bounds());
            b.bottom()
                .partial_cmp(&a.bottom())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let da = (a.x + a.w / 2.0 - ship_center).abs();
                    let db = (b.x + b.w / 2.0 - ship_center).abs();
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        let Some(target) = target else {
            return Vec::new();
        };

        // Re-aim now and then to avoid robotic tracking
        if self.rng.random_bool(0.1) {
            self.aim_offset = self.rng.random_range(-AIM_TOLERANCE..AIM_TOLERANCE);
        }

        let t = target.bounds();
        let aim = t.x + t.w / 2.0 + self.aim_offset;
        let error = aim - ship_center;

        let mut events = Vec::new();
        if error.abs() > AIM_TOLERANCE {
            let key = if error < 0.0 { Key::Left } else { Key::Right };
            events.push(KeyEvent::pressed(key));
            events.push(KeyEvent::released(key));
        } else if self.rng.random_bool(0.7) {
            events.push(KeyEvent::pressed(Key::Space));
            events.push(KeyEvent::released(Key::Space));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::{GamePhase, GameState, TickInput, tick};

    fn mapper() -> InputMapper {
        InputMapper::new(0.2)
    }

    #[test]
    fn test_movement_keys_step_once_per_press() {
        let mut m = mapper();
        assert_eq!(
            m.key_event(KeyEvent::pressed(Key::Left), 0.0),
            Some(Command::Step(Direction::Left))
        );
        assert_eq!(
            m.key_event(KeyEvent::pressed(Key::A), 0.0),
            Some(Command::Step(Direction::Left))
        );
        assert_eq!(
            m.key_event(KeyEvent::pressed(Key::D), 0.0),
            Some(Command::Step(Direction::Right))
        );
        assert_eq!(m.key_event(KeyEvent::released(Key::D), 0.0), None);
    }

    #[test]
    fn test_releases_produce_nothing_and_keep_cooldown() {
        let mut m = mapper();
        assert_eq!(m.key_event(KeyEvent::pressed(Key::Space), 1.0), Some(Command::Fire));
        for key in [Key::Left, Key::Right, Key::Space, Key::R, Key::Q] {
            assert_eq!(m.key_event(KeyEvent::released(key), 1.05), None);
        }
        // A release does not re-arm the fire window
        assert_eq!(m.key_event(KeyEvent::pressed(Key::Space), 1.1), None);
    }

    #[test]
    fn test_fire_is_rate_limited() {
        let mut m = mapper();
        let space = KeyEvent::pressed(Key::Space);
        assert_eq!(m.key_event(space, 1.0), Some(Command::Fire));
        assert_eq!(m.key_event(space, 1.1), None);
        assert_eq!(m.key_event(space, 1.19), None);
        assert_eq!(m.key_event(space, 1.25), Some(Command::Fire));
    }

    #[test]
    fn test_reset_cooldown_allows_immediate_fire() {
        let mut m = mapper();
        let space = KeyEvent::pressed(Key::Space);
        assert_eq!(m.key_event(space, 1.0), Some(Command::Fire));
        m.reset_cooldown();
        assert_eq!(m.key_event(space, 1.05), Some(Command::Fire));
    }

    #[test]
    fn test_two_fires_in_cooldown_make_one_projectile() {
        let mut m = mapper();
        let mut state = GameState::new(GameConfig::default());
        let mut input = TickInput::default();

        for now in [2.0, 2.1] {
            if let Some(Command::Fire) = m.key_event(KeyEvent::pressed(Key::Space), now) {
                input.fire = true;
            }
        }
        tick(&mut state, &input, 1.0 / 60.0);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_host_keys() {
        let mut m = mapper();
        assert_eq!(m.key_event(KeyEvent::pressed(Key::R), 0.0), Some(Command::Restart));
        assert_eq!(m.key_event(KeyEvent::pressed(Key::Q), 0.0), Some(Command::Quit));
        assert_eq!(m.key_event(KeyEvent::pressed(Key::Escape), 0.0), Some(Command::Quit));
        assert_eq!(m.key_event(KeyEvent::pressed(Key::Other), 0.0), None);
    }

    #[test]
    fn test_autopilot_is_deterministic_per_seed() {
        let state = GameState::new(GameConfig::default());
        let mut a = Autopilot::new(7);
        let mut b = Autopilot::new(7);
        for frame in 0..120 {
            let now = frame as f64 / 60.0;
            assert_eq!(a.poll(now, &state.snapshot()), b.poll(now, &state.snapshot()));
        }
    }

    #[test]
    fn test_autopilot_heads_for_lowest_invader() {
        let mut state = GameState::new(GameConfig::default());
        // Park the ship at the far right; the wave sits to its left
        state.ship.body.pos.x = 960.0;
        let mut pilot = Autopilot::new(1);
        let events = pilot.poll(0.0, &state.snapshot());
        assert_eq!(
            events,
            vec![KeyEvent::pressed(Key::Left), KeyEvent::released(Key::Left)]
        );
    }

    #[test]
    fn test_autopilot_restarts_after_game_over() {
        let mut state = GameState::new(GameConfig::default());
        state.phase = GamePhase::GameOver;
        let mut pilot = Autopilot::new(3);
        assert!(pilot.poll(10.0, &state.snapshot()).is_empty());
        assert!(pilot.poll(11.0, &state.snapshot()).is_empty());
        let events = pilot.poll(13.0, &state.snapshot());
        assert_eq!(events[0], KeyEvent::pressed(Key::R));
    }
}
