#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Paced tick loop that drives one Gem Maze level.
//!
//! A [`Session`] owns the world, the pursuit system and the LED matrix. Each
//! tick reads the latest requested direction, moves the player, checks for a
//! win, steps every enemy in order and handles a hit by flashing the alert
//! color, pausing, and either respawning everyone or ending the game. Every
//! tick finishes with exactly one present.

mod config;
mod paint;

pub use config::GameConfig;

use std::{thread, time::Duration};

use gem_maze_core::{Command, Event, GameStatus};
use gem_maze_rendering::{palette, LedMatrix, RenderingError};
use gem_maze_system_input::SharedDirection;
use gem_maze_system_pursuit::{Config as PursuitConfig, Pursuit};
use gem_maze_world::{self as world, query, Level, World};
use thiserror::Error;

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The level does not fit the display it is drawn on.
    #[error("level is {level_width}x{level_height} but the display is {display_width}x{display_height}")]
    GridMismatch {
        /// Columns in the level.
        level_width: u32,
        /// Rows in the level.
        level_height: u32,
        /// Columns on the display.
        display_width: u32,
        /// Rows on the display.
        display_height: u32,
    },
    /// Drawing or presenting failed.
    #[error(transparent)]
    Rendering(#[from] RenderingError),
}

/// Blocks the tick loop for fixed durations.
pub trait Pacer {
    /// Waits for the provided duration.
    fn pause(&mut self, duration: Duration);
}

/// Pacer that sleeps the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Game loop state for a single level.
#[derive(Debug)]
pub struct Session<M, P> {
    world: World,
    pursuit: Pursuit,
    matrix: M,
    pacer: P,
    direction: SharedDirection,
    config: GameConfig,
    ticks: u64,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl<M, P> Session<M, P>
where
    M: LedMatrix,
    P: Pacer,
{
    /// Builds the world for `level`, paints it and presents the first frame.
    pub fn new(
        level: Level,
        config: GameConfig,
        matrix: M,
        pacer: P,
        direction: SharedDirection,
    ) -> Result<Self, SessionError> {
        let level_grid = level.grid();
        let display_grid = matrix.grid();
        if level_grid != display_grid {
            return Err(SessionError::GridMismatch {
                level_width: level_grid.width(),
                level_height: level_grid.height(),
                display_width: display_grid.width(),
                display_height: display_grid.height(),
            });
        }

        let pursuit_config = match config.seed {
            Some(seed) => PursuitConfig::seeded(seed),
            None => PursuitConfig::from_entropy(),
        };
        direction.store(config.start_direction);

        let mut session = Self {
            world: World::new(level, config.lives),
            pursuit: Pursuit::new(pursuit_config),
            matrix,
            pacer,
            direction,
            config,
            ticks: 0,
            events: Vec::new(),
            commands: Vec::new(),
        };
        tracing::info!(
            banner = query::welcome_banner(&session.world),
            gems = query::total_gems(&session.world),
            lives = query::lives(&session.world),
            "level started"
        );
        paint::repaint(&session.world, &mut session.matrix)?;
        session.matrix.present()?;
        Ok(session)
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the matrix.
    #[must_use]
    pub fn matrix(&self) -> &M {
        &self.matrix
    }

    /// Read-only access to the pacer.
    #[must_use]
    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Settings the session was built with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        query::status(&self.world)
    }

    /// Number of ticks processed since the level last started.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Processes one tick and reports the resulting status.
    ///
    /// Terminal statuses are returned unchanged without touching the display.
    pub fn tick(&mut self) -> Result<GameStatus, SessionError> {
        let status = self.status();
        if status.is_terminal() {
            return Ok(status);
        }
        self.ticks = self.ticks.saturating_add(1);

        let direction = self.direction.load();
        self.submit(Command::MovePlayer { direction })?;
        tracing::debug!(
            tick = self.ticks,
            ?direction,
            x = query::player(&self.world).position.x(),
            y = query::player(&self.world).position.y(),
            "player stepped"
        );

        if self.status() == GameStatus::LevelWon {
            tracing::info!(ticks = self.ticks, "every gem collected, level won");
            self.matrix.fill_all(palette::WIN);
            self.matrix.present()?;
            return Ok(GameStatus::LevelWon);
        }

        self.commands.clear();
        self.pursuit.handle(
            &query::enemy_view(&self.world),
            query::player(&self.world).position,
            query::wall_view(&self.world),
            &mut self.commands,
        );
        let commands = std::mem::take(&mut self.commands);
        for &command in &commands {
            self.submit(command)?;
            if self.status() == GameStatus::Resetting {
                break;
            }
        }
        self.commands = commands;

        if self.status() == GameStatus::Resetting {
            self.resolve_hit()?;
        }

        self.matrix.present()?;
        Ok(self.status())
    }

    /// Ticks with the configured delay until the game ends.
    pub fn run(&mut self) -> Result<GameStatus, SessionError> {
        self.run_for(None)
    }

    /// Ticks with the configured delay until the game ends or `max_ticks`
    /// ticks have been processed by this call.
    pub fn run_for(&mut self, max_ticks: Option<u64>) -> Result<GameStatus, SessionError> {
        let mut processed = 0u64;
        loop {
            let status = self.status();
            if status.is_terminal() || max_ticks.is_some_and(|limit| processed >= limit) {
                return Ok(status);
            }
            self.pacer.pause(self.config.tick_delay());
            let _ = self.tick()?;
            processed += 1;
        }
    }

    /// Rebuilds the level with fresh gems and lives and repaints it.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.ticks = 0;
        self.direction.store(self.config.start_direction);
        self.submit(Command::RestartLevel)?;
        tracing::info!(lives = query::lives(&self.world), "level restarted");
        self.matrix.present()?;
        Ok(())
    }

    fn submit(&mut self, command: Command) -> Result<(), RenderingError> {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);
        paint::apply_events(&self.world, &self.events, &mut self.matrix)
    }

    fn resolve_hit(&mut self) -> Result<(), SessionError> {
        tracing::info!(
            lives = query::lives(&self.world),
            "player caught, pausing before reset"
        );
        self.matrix.fill_all(palette::HIT_ALERT);
        self.matrix.present()?;
        self.pacer.pause(self.config.hit_pause());

        self.submit(Command::ResolveHit)?;
        match self.status() {
            GameStatus::LivesExhausted => tracing::info!(ticks = self.ticks, "no lives left"),
            _ => tracing::info!(
                lives = query::lives(&self.world),
                "player and enemies back at spawn"
            ),
        }
        Ok(())
    }
}
