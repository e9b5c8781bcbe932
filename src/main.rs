use std::io::{self, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{cursor, execute, terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flappy_wave::input::{GestureInput, HandTracker, KeyboardInput};
use flappy_wave::render::Renderer;
use flappy_wave::{
    AudioSink, ClockSource, ControlMode, Flow, FramePacer, GameConfig, GameSession, InputSource,
    SilentAudio, SystemClock,
};

#[derive(Debug, Parser)]
#[command(version, about = "Flappy Bird in the terminal")]
struct Args {
    /// TOML file overriding the default game constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for pipe placement
    #[arg(long)]
    seed: Option<u64>,

    /// Start in gesture control mode. This build has no hand tracker, so
    /// control falls back to the keyboard on the first frame.
    #[arg(long)]
    gesture: bool,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Disable sound
    #[arg(long)]
    mute: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref())?;

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    info!(?config, "starting");

    let mut audio: Box<dyn AudioSink> = if args.mute {
        Box::new(SilentAudio)
    } else {
        open_audio()
    };
    let mut session = GameSession::new(config)?;
    if args.gesture {
        session.set_control_mode(ControlMode::Gesture);
    }

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    // No camera tracker ships with the terminal build.
    let result = run(&mut session, audio.as_mut(), None, &mut out);

    cleanup(&mut out)?;
    result
}

fn run(
    session: &mut GameSession,
    audio: &mut dyn AudioSink,
    tracker: Option<Box<dyn HandTracker>>,
    out: &mut impl Write,
) -> Result<()> {
    let clock = SystemClock::new();
    let mut pacer = FramePacer::new(session.config().tick_rate);
    let mut keyboard = KeyboardInput::new();
    let mut gesture = tracker.map(GestureInput::new);
    let mut device = session.input_device();

    let (mut cols, mut rows) = terminal::size()?;
    let mut renderer = Renderer::new(cols, rows);

    loop {
        pacer.begin();
        let now = clock.now_ms();

        // Input
        let mut poll = keyboard.poll();
        if session.control_mode() == ControlMode::Gesture {
            match gesture.as_mut() {
                Some(g) => {
                    if session.input_device() != device {
                        device = session.input_device();
                        if let Err(e) = g.select_device(device) {
                            warn!("camera switch failed: {e}");
                            poll.downgrade = true;
                        }
                    }
                    poll.merge(g.poll());
                }
                None => {
                    warn!("gesture control needs a hand tracker; staying on keyboard");
                    poll.downgrade = true;
                }
            }
        }
        if session.handle_poll(poll, now) == Flow::Quit {
            info!(score = session.score(), "quit");
            return Ok(());
        }

        // Update
        session.update(now);
        for sound in session.drain_sounds() {
            audio.play(sound);
        }

        // Render
        let (c, r) = terminal::size()?;
        if (c, r) != (cols, rows) {
            (cols, rows) = (c, r);
            renderer.resize(cols, rows);
        }
        renderer.draw(&session.snapshot(), out)?;

        // Frame pacing
        pacer.wait();
    }
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    // stderr belongs to the game screen, so logging is file-only.
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(feature = "audio")]
fn open_audio() -> Box<dyn AudioSink> {
    match flappy_wave::audio::SynthAudio::new() {
        Ok(audio) => Box::new(audio),
        Err(e) => {
            warn!("{e}, running silent");
            Box::new(SilentAudio)
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_audio() -> Box<dyn AudioSink> {
    Box::new(SilentAudio)
}
