#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Button sampling that feeds the latest directional intent to the tick loop.
//!
//! The sampler polls a [`ButtonPanel`] on its own thread and overwrites a
//! [`SharedDirection`] whenever a direction button is held. The tick loop reads
//! that cell whenever it runs. Presses are not queued: the last writer wins and
//! a rapid sequence of presses between two ticks collapses into the final one.

use std::{
    io,
    sync::{
        atomic::{AtomicBool, AtomicU8, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use gem_maze_core::Direction;

/// Frequency of the click played on every accepted press.
pub const PRESS_TONE_HZ: u32 = 1000;

/// Physical buttons on the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    /// Directional pad up.
    Up,
    /// Directional pad down.
    Down,
    /// Directional pad left.
    Left,
    /// Directional pad right.
    Right,
    /// First auxiliary button.
    A,
    /// Second auxiliary button.
    B,
}

impl Button {
    /// Direction buttons in the order the sampler polls them.
    pub const DIRECTIONS: [Button; 4] = [Button::Up, Button::Down, Button::Left, Button::Right];

    /// Direction selected by the button, if it is part of the directional pad.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            Self::A | Self::B => None,
        }
    }
}

/// Source of instantaneous, non-blocking button state.
pub trait ButtonPanel {
    /// Reports whether the button is held down right now.
    fn is_pressed(&self, button: Button) -> bool;
}

/// Fire-and-forget audio and haptic output acknowledging a press.
pub trait Feedback {
    /// Starts a tone at the given frequency.
    fn play_tone(&mut self, frequency_hz: u32);
    /// Silences the tone.
    fn stop_tone(&mut self);
    /// Starts the vibration motor.
    fn vibrate(&mut self);
    /// Stops the vibration motor.
    fn stop(&mut self);
}

/// Feedback implementation that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Feedback for Silent {
    fn play_tone(&mut self, _frequency_hz: u32) {}

    fn stop_tone(&mut self) {}

    fn vibrate(&mut self) {}

    fn stop(&mut self) {}
}

/// Latest direction requested by the player, shared between threads.
///
/// Cloning yields another handle to the same cell.
#[derive(Clone, Debug)]
pub struct SharedDirection {
    cell: Arc<AtomicU8>,
}

impl SharedDirection {
    /// Creates a cell holding the provided direction.
    #[must_use]
    pub fn new(initial: Direction) -> Self {
        Self {
            cell: Arc::new(AtomicU8::new(encode(initial))),
        }
    }

    /// Reads the most recently stored direction.
    #[must_use]
    pub fn load(&self) -> Direction {
        decode(self.cell.load(Ordering::Acquire))
    }

    /// Replaces the stored direction.
    pub fn store(&self, direction: Direction) {
        self.cell.store(encode(direction), Ordering::Release);
    }
}

impl Default for SharedDirection {
    fn default() -> Self {
        Self::new(Direction::Right)
    }
}

const fn encode(direction: Direction) -> u8 {
    match direction {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

const fn decode(value: u8) -> Direction {
    match value {
        0 => Direction::Up,
        1 => Direction::Down,
        2 => Direction::Left,
        _ => Direction::Right,
    }
}

/// Timing parameters of the sampler loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Pause after each accepted press.
    pub debounce: Duration,
    /// Pause between two polling passes.
    pub poll_interval: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            poll_interval: Duration::from_millis(5),
        }
    }
}

/// Polls the direction buttons and publishes presses to a [`SharedDirection`].
#[derive(Debug)]
pub struct InputSampler<P, F> {
    panel: P,
    feedback: F,
    direction: SharedDirection,
    config: SamplerConfig,
}

impl<P, F> InputSampler<P, F>
where
    P: ButtonPanel,
    F: Feedback,
{
    /// Creates a sampler that writes into the provided direction cell.
    #[must_use]
    pub fn new(panel: P, feedback: F, direction: SharedDirection, config: SamplerConfig) -> Self {
        Self {
            panel,
            feedback,
            direction,
            config,
        }
    }

    /// Runs a single polling pass over Up, Down, Left and Right.
    ///
    /// Every held button plays the press tone, starts the vibration motor,
    /// stores its direction and waits out the debounce delay, so when several
    /// buttons are held the last one polled wins. Feedback is switched off at
    /// the end of the pass. Returns the direction stored last, if any.
    pub fn sample_once(&mut self) -> Option<Direction> {
        let mut latest = None;

        for button in Button::DIRECTIONS {
            if !self.panel.is_pressed(button) {
                continue;
            }
            let Some(direction) = button.direction() else {
                continue;
            };

            self.feedback.play_tone(PRESS_TONE_HZ);
            self.feedback.vibrate();
            self.direction.store(direction);
            tracing::debug!(?direction, "direction button pressed");
            latest = Some(direction);

            if !self.config.debounce.is_zero() {
                thread::sleep(self.config.debounce);
            }
        }

        self.feedback.stop_tone();
        self.feedback.stop();
        latest
    }
}

impl<P, F> InputSampler<P, F>
where
    P: ButtonPanel + Send + 'static,
    F: Feedback + Send + 'static,
{
    /// Moves the sampler onto a dedicated thread that polls until stopped.
    pub fn spawn(mut self) -> io::Result<SamplerHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let poll_interval = self.config.poll_interval;

        let thread = thread::Builder::new()
            .name("input-sampler".into())
            .spawn(move || {
                tracing::debug!("input sampler started");
                while flag.load(Ordering::Acquire) {
                    let _ = self.sample_once();
                    thread::sleep(poll_interval);
                }
                tracing::debug!("input sampler stopped");
            })?;

        Ok(SamplerHandle { running, thread })
    }
}

/// Handle to a sampler thread started by [`InputSampler::spawn`].
#[derive(Debug)]
pub struct SamplerHandle {
    running: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl SamplerHandle {
    /// Reports whether the sampler thread is still polling.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Signals the sampler to stop and waits for its thread to exit.
    pub fn stop(self) {
        self.running.store(false, Ordering::Release);
        if self.thread.join().is_err() {
            tracing::warn!("input sampler thread panicked");
        }
    }
}
