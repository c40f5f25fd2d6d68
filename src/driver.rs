//! Frame clock and loop driver
//!
//! The host calls [`LoopDriver::frame`] at whatever rate it manages, passing
//! its own timestamp. The driver turns that into a clamped `dt`, runs one
//! simulation tick with the commands queued since the last frame, routes the
//! resulting events to audio and renders the snapshot. Once the game is over
//! frames keep rendering the frozen state without simulating.

use crate::audio::{AudioSink, Music, SoundEffect};
use crate::error::Result;
use crate::input::{Command, InputMapper, KeyEvent};
use crate::renderer::Renderer;
use crate::settings::GameConfig;
use crate::sim::{GameEvent, GameState, TickInput, tick};

/// Turns host timestamps into frame deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last timestamp; the next frame only re-arms the clock
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Seconds since the previous call, `None` on the first one
    ///
    /// A host clock that steps backwards yields a zero delta.
    pub fn delta(&mut self, now: f64) -> Option<f32> {
        let last = self.last.replace(now)?;
        Some((now - last).max(0.0) as f32)
    }
}

/// Owns the game session and runs it one host frame at a time
pub struct LoopDriver<R: Renderer, A: AudioSink> {
    config: GameConfig,
    state: GameState,
    renderer: R,
    audio: A,
    mapper: InputMapper,
    clock: FrameClock,
    pending: TickInput,
    music_volume: f32,
    running: bool,
}

impl<R: Renderer, A: AudioSink> LoopDriver<R, A> {
    pub fn new(config: GameConfig, renderer: R, audio: A, music_volume: f32) -> Self {
        Self {
            state: GameState::new(config.clone()),
            mapper: InputMapper::new(config.fire_cooldown),
            config,
            renderer,
            audio,
            clock: FrameClock::new(),
            pending: TickInput::default(),
            music_volume,
            running: false,
        }
    }

    /// Begin accepting frames
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.clock.reset();
        self.audio
            .play_looping_music(Music::Background, self.music_volume);
        log::info!("Game loop started");
    }

    /// Stop accepting frames
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.audio.stop_music();
        log::info!("Game loop stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Feed one key event received at host time `now`
    ///
    /// Movement and fire are queued for the next frame. Restart is applied
    /// immediately when the game is over. The mapped command is returned so
    /// the host can act on [`Command::Quit`].
    pub fn handle_key(&mut self, event: KeyEvent, now: f64) -> Option<Command> {
        let command = self.mapper.key_event(event, now)?;
        match command {
            Command::Step(direction) => self.pending.steps.push(direction),
            Command::Fire => self.pending.fire = true,
            Command::Restart if self.state.is_game_over() => self.restart(),
            Command::Restart => log::debug!("Restart ignored while playing"),
            Command::Quit => {}
        }
        Some(command)
    }

    /// Start a fresh session at level 1
    pub fn restart(&mut self) {
        log::info!("Restarting game");
        self.state = GameState::new(self.config.clone());
        self.mapper.reset();
        self.clock.reset();
        self.pending = TickInput::default();
    }

    /// Run one host frame at time `now` (seconds)
    pub fn frame(&mut self, now: f64) -> Result<()> {
        if !self.running {
            return Ok(());
        }

        let dt = self.clock.delta(now);
        if self.state.is_game_over() {
            self.pending = TickInput::default();
        } else if let Some(dt) = dt {
            let dt = dt.min(self.config.max_frame_dt);
            let input = std::mem::take(&mut self.pending);
            let events = tick(&mut self.state, &input, dt);
            self.dispatch(&events);
        }

        self.renderer.render(&self.state.snapshot())
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            if *event == GameEvent::ShipHit {
                self.mapper.reset_cooldown();
            }
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play_effect(effect);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::input::Key;
    use crate::sim::{Invader, InvaderSkin, Snapshot};
    use glam::Vec2;

    #[derive(Default)]
    struct RecordingRenderer {
        frames: usize,
        last_game_over: bool,
        last_projectiles: usize,
        fail: bool,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, snapshot: &Snapshot<'_>) -> Result<()> {
            if self.fail {
                return Err(GameError::Render(std::io::Error::other("closed")));
            }
            self.frames += 1;
            self.last_game_over = snapshot.game_over;
            self.last_projectiles = snapshot.projectiles.len();
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingAudio {
        effects: Vec<SoundEffect>,
        music: Vec<(Music, f32)>,
        stops: usize,
    }

    impl AudioSink for RecordingAudio {
        fn play_effect(&mut self, effect: SoundEffect) {
            self.effects.push(effect);
        }

        fn play_looping_music(&mut self, music: Music, volume: f32) {
            self.music.push((music, volume));
        }

        fn stop_music(&mut self) {
            self.stops += 1;
        }
    }

    fn driver() -> LoopDriver<RecordingRenderer, RecordingAudio> {
        let mut driver = LoopDriver::new(
            GameConfig::default(),
            RecordingRenderer::default(),
            RecordingAudio::default(),
            0.5,
        );
        driver.start();
        driver
    }

    #[test]
    fn test_clock_first_delta_is_none() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta(10.0), None);
        assert_eq!(clock.delta(10.5), Some(0.5));
        assert_eq!(clock.delta(10.0), Some(0.0));
        clock.reset();
        assert_eq!(clock.delta(20.0), None);
    }

    #[test]
    fn test_start_and_stop_control_music_and_frames() {
        let mut d = driver();
        assert!(d.is_running());
        assert_eq!(d.audio().music, vec![(Music::Background, 0.5)]);

        d.stop();
        assert!(!d.is_running());
        assert_eq!(d.audio().stops, 1);
        d.frame(1.0).unwrap();
        assert_eq!(d.renderer().frames, 0);
    }

    #[test]
    fn test_first_frame_renders_without_simulating() {
        let mut d = driver();
        d.frame(5.0).unwrap();
        assert_eq!(d.renderer().frames, 1);
        assert_eq!(d.state().time_ticks, 0);

        d.frame(5.016).unwrap();
        assert_eq!(d.state().time_ticks, 1);
    }

    #[test]
    fn test_queued_fire_reaches_next_tick_and_plays_shot() {
        let mut d = driver();
        d.frame(0.0).unwrap();
        let fire = KeyEvent::pressed(Key::Space);
        assert_eq!(d.handle_key(fire, 0.001), Some(Command::Fire));
        // Inside the cooldown: dropped
        assert_eq!(d.handle_key(fire, 0.05), None);
        d.frame(0.016).unwrap();

        assert_eq!(d.state().projectiles.len(), 1);
        assert_eq!(d.renderer().last_projectiles, 1);
        assert_eq!(d.audio().effects, vec![SoundEffect::Shot]);

        // Queue was consumed
        d.frame(0.032).unwrap();
        assert_eq!(d.state().projectiles.len(), 1);
    }

    #[test]
    fn test_large_gap_is_clamped() {
        let mut d = driver();
        d.frame(0.0).unwrap();
        let x = d.state().invaders[0].body.pos.x;
        d.frame(30.0).unwrap();
        let moved = d.state().invaders[0].body.pos.x - x;
        assert!((moved - 60.0 * 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_game_over_freezes_but_keeps_rendering() {
        let mut d = driver();
        d.state.lives = 1;
        let config = d.config.clone();
        d.state.invaders = vec![Invader::new(
            Vec2::new(0.0, 940.0),
            &config,
            InvaderSkin::Green,
            0.15,
        )];

        d.frame(0.0).unwrap();
        d.frame(0.016).unwrap();
        assert!(d.state().is_game_over());
        assert!(d.renderer().last_game_over);
        assert_eq!(d.audio().effects, vec![SoundEffect::ShipHit]);

        let ticks = d.state().time_ticks;
        d.handle_key(KeyEvent::pressed(Key::Left), 0.02);
        for i in 2..10 {
            d.frame(i as f64 * 0.016).unwrap();
        }
        assert_eq!(d.state().time_ticks, ticks);
        assert_eq!(d.renderer().frames, 10);
    }

    #[test]
    fn test_ship_hit_resets_fire_cooldown() {
        let mut d = driver();
        let config = d.config.clone();
        d.frame(0.0).unwrap();
        d.handle_key(KeyEvent::pressed(Key::Space), 0.001);
        d.frame(0.016).unwrap();

        d.state.invaders = vec![Invader::new(
            Vec2::new(0.0, 940.0),
            &config,
            InvaderSkin::Green,
            0.15,
        )];
        d.frame(0.032).unwrap();
        assert_eq!(d.state().lives, 2);

        // Well inside the 0.2s window, but the hit cleared it
        assert_eq!(
            d.handle_key(KeyEvent::pressed(Key::Space), 0.05),
            Some(Command::Fire)
        );
    }

    #[test]
    fn test_restart_only_after_game_over() {
        let mut d = driver();
        d.frame(0.0).unwrap();
        d.handle_key(KeyEvent::pressed(Key::Right), 0.001);
        d.frame(0.016).unwrap();
        let moved = d.state().ship.body.pos;

        assert_eq!(
            d.handle_key(KeyEvent::pressed(Key::R), 0.02),
            Some(Command::Restart)
        );
        assert_eq!(d.state().ship.body.pos, moved);

        d.state.phase = crate::sim::GamePhase::GameOver;
        d.state.score = 500;
        d.handle_key(KeyEvent::pressed(Key::R), 0.03);
        assert!(!d.state().is_game_over());
        assert_eq!(d.state().score, 0);
        assert_eq!(d.state().lives, 3);
        assert_eq!(d.state().level, 1);

        // Clock was reset: next frame only re-arms it
        d.frame(0.5).unwrap();
        assert_eq!(d.state().time_ticks, 0);
    }

    #[test]
    fn test_quit_is_passed_to_host() {
        let mut d = driver();
        assert_eq!(
            d.handle_key(KeyEvent::pressed(Key::Q), 0.0),
            Some(Command::Quit)
        );
        assert!(d.is_running());
    }

    #[test]
    fn test_render_failure_propagates() {
        let mut d = driver();
        d.renderer_mut().fail = true;
        assert!(matches!(d.frame(0.0), Err(GameError::Render(_))));
    }
}
