use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    ExecutableCommand, cursor,
    event::{
        self, Event, KeyCode, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal,
};

use space_invaders::audio::AudioManager;
use space_invaders::input::{Autopilot, Command, Key, KeyAction, KeyEvent};
use space_invaders::renderer::TerminalRenderer;
use space_invaders::{LoopDriver, Settings};

#[derive(Parser, Debug)]
#[command(name = "space-invaders")]
#[command(about = "Terminal Space Invaders")]
struct Cli {
    /// JSON settings file (game tuning and audio preferences)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the sprites/ folder
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    /// Let the autopilot play
    #[arg(long)]
    demo: bool,
    /// Autopilot seed (defaults to the clock)
    #[arg(long)]
    seed: Option<u64>,
    /// Disable all audio
    #[arg(long)]
    mute: bool,
    /// Target frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

/// Translate a terminal key event into a game key event
fn map_key(code: KeyCode, kind: KeyEventKind) -> Option<KeyEvent> {
    let action = match kind {
        KeyEventKind::Press | KeyEventKind::Repeat => KeyAction::Pressed,
        KeyEventKind::Release => KeyAction::Released,
    };
    let key = match code {
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => Key::A,
            'd' => Key::D,
            ' ' => Key::Space,
            'r' => Key::R,
            'q' => Key::Q,
            _ => Key::Other,
        },
        _ => return None,
    };
    Some(KeyEvent { key, action })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Space Invaders starting...");

    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if cli.mute {
        settings.audio.muted = true;
    }

    let mut out = BufWriter::new(stdout());
    let (cols, rows) = terminal::size().context("querying terminal size")?;
    let mut assets = space_invaders::assets::Assets::new(&cli.assets);
    let renderer = TerminalRenderer::new(BufWriter::new(stdout()), &mut assets, cols, rows)
        .with_context(|| format!("loading sprites from {}", cli.assets.display()))?;
    let audio = AudioManager::new(&settings.audio);
    let mut driver = LoopDriver::new(settings.game, renderer, audio, settings.audio.music_volume);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Key-release events where the terminal supports them
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread; the game loop only drains
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let seed = cli.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    let autopilot = cli.demo.then(|| {
        log::info!("Demo mode, autopilot seed {}", seed);
        Autopilot::new(seed)
    });

    let result = run(&mut driver, &rx, autopilot, cli.fps);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();

    let state = driver.state();
    log::info!(
        "Finished at level {} with score {}",
        state.level,
        state.score
    );
    result
}

fn run<W: Write>(
    driver: &mut LoopDriver<TerminalRenderer<W>, AudioManager>,
    rx: &mpsc::Receiver<Event>,
    mut autopilot: Option<Autopilot>,
    fps: u32,
) -> Result<()> {
    let frame = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    let epoch = Instant::now();

    driver.start();
    'game: loop {
        let frame_start = Instant::now();
        let now = epoch.elapsed().as_secs_f64();

        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(key) => {
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        break 'game;
                    }
                    let Some(key_event) = map_key(key.code, key.kind) else {
                        continue;
                    };
                    if driver.handle_key(key_event, now) == Some(Command::Quit) {
                        break 'game;
                    }
                }
                Event::Resize(cols, rows) => driver.renderer_mut().resize(cols, rows),
                _ => {}
            }
        }

        if let Some(pilot) = autopilot.as_mut() {
            for key_event in pilot.poll(now, &driver.state().snapshot()) {
                driver.handle_key(key_event, now);
            }
        }

        driver.frame(now).context("rendering frame")?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
    }
    driver.stop();
    Ok(())
}
