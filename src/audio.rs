//! Audio system
//!
//! Procedurally generated tones, no sample files needed. Real playback goes
//! through rodio when the `sound` feature is enabled; otherwise every cue is
//! only logged.

use crate::settings::AudioSettings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ship fires
    Shot,
    /// Invader destroyed
    InvaderExplosion,
    /// Invader reached the ship
    ShipHit,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::ShotFired => Some(SoundEffect::Shot),
            GameEvent::InvaderDestroyed => Some(SoundEffect::InvaderExplosion),
            GameEvent::ShipHit => Some(SoundEffect::ShipHit),
            // Always preceded by ShipHit in the same frame
            GameEvent::GameOver => None,
            GameEvent::LevelCleared { .. } => None,
        }
    }
}

/// Music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Music {
    /// Four-note march, looped while playing
    Background,
}

/// Where the loop driver sends its audio cues
pub trait AudioSink {
    fn play_effect(&mut self, effect: SoundEffect);
    fn play_looping_music(&mut self, music: Music, volume: f32);
    fn stop_music(&mut self);
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(feature = "sound")]
    backend: Option<backend::RodioBackend>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(&AudioSettings::default())
    }
}

impl AudioManager {
    pub fn new(settings: &AudioSettings) -> Self {
        Self {
            #[cfg(feature = "sound")]
            backend: if settings.muted {
                None
            } else {
                match backend::RodioBackend::open() {
                    Ok(backend) => Some(backend),
                    Err(e) => {
                        log::warn!("{} - audio disabled", e);
                        None
                    }
                }
            },
            master_volume: settings.master_volume.clamp(0.0, 1.0),
            sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
            muted: settings.muted,
        }
    }

    /// Effective effect volume
    fn effect_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Effective music volume for a requested track volume
    fn music_volume(&self, volume: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * volume.clamp(0.0, 1.0)
        }
    }
}

impl AudioSink for AudioManager {
    fn play_effect(&mut self, effect: SoundEffect) {
        let vol = self.effect_volume();
        if vol <= 0.0 {
            return;
        }
        log::debug!("Effect {:?} at {:.2}", effect, vol);
        self.output_effect(effect, vol);
    }

    fn play_looping_music(&mut self, music: Music, volume: f32) {
        let vol = self.music_volume(volume);
        if vol <= 0.0 {
            return;
        }
        log::debug!("Music {:?} at {:.2}", music, vol);
        self.output_music(Some((music, vol)));
    }

    fn stop_music(&mut self) {
        self.output_music(None);
    }
}

#[cfg(feature = "sound")]
impl AudioManager {
    fn output_effect(&self, effect: SoundEffect, vol: f32) {
        if let Some(backend) = &self.backend {
            backend.play_effect(effect, vol);
        }
    }

    fn output_music(&mut self, track: Option<(Music, f32)>) {
        if let Some(backend) = &mut self.backend {
            match track {
                Some((music, vol)) => backend.play_music(music, vol),
                None => backend.stop_music(),
            }
        }
    }
}

#[cfg(not(feature = "sound"))]
impl AudioManager {
    fn output_effect(&self, _effect: SoundEffect, _vol: f32) {}

    fn output_music(&mut self, _track: Option<(Music, f32)>) {}
}

#[cfg(feature = "sound")]
mod backend {
    use std::time::Duration;

    use rodio::source::{SineWave, Source, from_iter};
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{Music, SoundEffect};
    use crate::error::{GameError, Result};

    /// Bass line of the background march (Hz)
    const MARCH_NOTES: [f32; 4] = [98.0, 92.5, 87.3, 82.4];

    pub(super) struct RodioBackend {
        // Dropping the stream silences everything
        _stream: OutputStream,
        handle: OutputStreamHandle,
        music: Option<Sink>,
    }

    impl RodioBackend {
        pub(super) fn open() -> Result<Self> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| GameError::Audio(e.to_string()))?;
            log::info!("Audio output opened");
            Ok(Self {
                _stream: stream,
                handle,
                music: None,
            })
        }

        fn tone(freq: f32, millis: u64, vol: f32) -> impl Source<Item = f32> + Send + 'static {
            SineWave::new(freq)
                .take_duration(Duration::from_millis(millis))
                .amplify(vol)
        }

        pub(super) fn play_effect(&self, effect: SoundEffect, vol: f32) {
            let result = match effect {
                // Short high blip
                SoundEffect::Shot => self.handle.play_raw(Self::tone(880.0, 60, vol * 0.3)),
                // Low two-tone thud
                SoundEffect::InvaderExplosion => self.handle.play_raw(
                    Self::tone(110.0, 180, vol * 0.4).mix(Self::tone(147.0, 120, vol * 0.3)),
                ),
                // Long falling pair
                SoundEffect::ShipHit => self.handle.play_raw(from_iter([
                    Self::tone(220.0, 250, vol * 0.5),
                    Self::tone(110.0, 450, vol * 0.5),
                ])),
            };
            if let Err(e) = result {
                log::warn!("Failed to play {:?}: {}", effect, e);
            }
        }

        pub(super) fn play_music(&mut self, music: Music, vol: f32) {
            self.stop_music();
            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(e) => {
                    log::warn!("Failed to start {:?}: {}", music, e);
                    return;
                }
            };
            match music {
                Music::Background => {
                    let notes = MARCH_NOTES.map(|freq| Self::tone(freq, 400, vol * 0.25));
                    sink.append(from_iter(notes).repeat_infinite());
                }
            }
            self.music = Some(sink);
        }

        pub(super) fn stop_music(&mut self) {
            if let Some(sink) = self.music.take() {
                sink.stop();
            }
        }
    }
}
