#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Gem Maze experience.

mod config;

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, TryRecvError},
        Arc,
    },
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use gem_maze_core::GameStatus;
use gem_maze_rendering::{
    Frame, FrameBuffer, FrameSink, FrameUpdate, LedMatrix, Presentation, RenderingBackend,
    RenderingError,
};
use gem_maze_rendering_macroquad::{KeyboardButtons, MacroquadBackend};
use gem_maze_system_input::{Button, ButtonPanel, InputSampler, SharedDirection, Silent};
use gem_maze_system_session::{GameConfig, Pacer, Session, SessionError, ThreadPacer};
use gem_maze_world::{query, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use crate::config::Overrides;

/// Command-line arguments accepted by the Gem Maze binary.
#[derive(Debug, Parser)]
#[command(name = "gem-maze", about = "Collect every gem before the enemies catch you")]
struct CliArgs {
    /// TOML file with game settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Delay between ticks in milliseconds.
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,
    /// Lives the player starts with.
    #[arg(long)]
    lives: Option<u32>,
    /// Seed for random enemies.
    #[arg(long)]
    seed: Option<u64>,
    /// Run without a window, logging frames as text.
    #[arg(long)]
    headless: bool,
    /// Stop after this many ticks.
    #[arg(long, value_name = "TICKS")]
    max_ticks: Option<u64>,
}

impl CliArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            tick_ms: self.tick_ms,
            lives: self.lives,
            seed: self.seed,
        }
    }
}

/// Entry point for the Gem Maze command-line interface.
fn main() -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directives))
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = config::load(args.config.as_deref(), args.overrides())
        .context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");

    if args.headless {
        run_headless(Level::classic(), config, args.max_ticks)
    } else {
        run_windowed(Level::classic(), config, args.max_ticks)
    }
}

/// Builds the log filter from `RUST_LOG` style directives, defaulting to `info`.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

/// Frame sink that logs every frame and keeps the latest one.
#[derive(Debug, Default)]
struct TextDisplay {
    last: Option<Frame>,
}

impl FrameSink for TextDisplay {
    fn publish(&mut self, frame: Frame) -> Result<(), RenderingError> {
        tracing::debug!(sequence = frame.sequence(), "\n{}", frame.to_ascii());
        self.last = Some(frame);
        Ok(())
    }
}

fn run_headless(level: Level, config: GameConfig, max_ticks: Option<u64>) -> Result<()> {
    let matrix = FrameBuffer::new(level.grid(), TextDisplay::default());
    let direction = SharedDirection::new(config.start_direction);
    let mut session = Session::new(level, config, matrix, ThreadPacer, direction)
        .context("failed to start session")?;

    let status = session.run_for(max_ticks).context("session failed")?;
    report(&session, status);
    if let Some(frame) = &session.matrix().sink().last {
        println!("{}", frame.to_ascii());
    }
    Ok(())
}

fn run_windowed(level: Level, config: GameConfig, max_ticks: Option<u64>) -> Result<()> {
    let buttons = KeyboardButtons::new();
    let direction = SharedDirection::new(config.start_direction);
    let sampler = InputSampler::new(
        buttons.clone(),
        Silent,
        direction.clone(),
        config.sampler_config(),
    )
    .spawn()
    .context("failed to start input sampler")?;

    let presentation = Presentation::new("Gem Maze", level.grid());
    let (sender, receiver) = mpsc::channel();
    let matrix = FrameBuffer::new(level.grid(), sender);
    let session = Session::new(level, config, matrix, ThreadPacer, direction)
        .context("failed to start session")?;

    let display_closed = Arc::new(AtomicBool::new(false));
    let game = {
        let buttons = buttons.clone();
        let display_closed = Arc::clone(&display_closed);
        thread::Builder::new()
            .name("game-session".into())
            .spawn(move || play(session, &buttons, &display_closed, max_ticks))
            .context("failed to start game session")?
    };

    let result = MacroquadBackend::new(buttons)
        .with_vsync(true)
        .run(presentation, move |_dt| latest_frame(&receiver));

    display_closed.store(true, Ordering::Release);
    sampler.stop();
    match game.join() {
        Ok(outcome) => outcome.context("session failed")?,
        Err(_) => anyhow::bail!("game session thread panicked"),
    }
    result
}

/// Drains the channel, keeping only the newest frame.
fn latest_frame(receiver: &Receiver<Frame>) -> FrameUpdate {
    let mut latest = None;
    loop {
        match receiver.try_recv() {
            Ok(frame) => latest = Some(frame),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                return latest.map_or(FrameUpdate::Exit, FrameUpdate::Show);
            }
        }
    }
    latest.map_or(FrameUpdate::Keep, FrameUpdate::Show)
}

/// Plays until the game ends, then waits for A to restart or B to quit.
fn play<M, P>(
    mut session: Session<M, P>,
    buttons: &KeyboardButtons,
    display_closed: &AtomicBool,
    max_ticks: Option<u64>,
) -> Result<(), SessionError>
where
    M: LedMatrix,
    P: Pacer,
{
    let poll_interval = session.config().sampler_config().poll_interval;
    loop {
        let status = match session.run_for(max_ticks) {
            Ok(status) => status,
            Err(SessionError::Rendering(RenderingError::DisplayDisconnected)) => {
                tracing::info!("display closed, ending session");
                return Ok(());
            }
            Err(error) => return Err(error),
        };
        report(&session, status);
        if !status.is_terminal() {
            return Ok(());
        }

        match wait_for_choice(buttons, display_closed, poll_interval) {
            Some(Button::A) => session.restart()?,
            _ => return Ok(()),
        }
    }
}

fn wait_for_choice(
    buttons: &KeyboardButtons,
    display_closed: &AtomicBool,
    poll_interval: Duration,
) -> Option<Button> {
    tracing::info!("press A to play again or B to quit");
    while !display_closed.load(Ordering::Acquire) {
        for button in [Button::A, Button::B] {
            if buttons.is_pressed(button) {
                return Some(button);
            }
        }
        thread::sleep(poll_interval.max(Duration::from_millis(1)));
    }
    None
}

fn report<M, P>(session: &Session<M, P>, status: GameStatus)
where
    M: LedMatrix,
    P: Pacer,
{
    let world = session.world();
    tracing::info!(
        ?status,
        ticks = session.ticks(),
        lives = query::lives(world),
        gems = query::player(world).found_gems,
        total = query::total_gems(world),
        "{}",
        query::welcome_banner(world)
    );
}
