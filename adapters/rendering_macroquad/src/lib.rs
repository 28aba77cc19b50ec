#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed LED matrix display and keyboard controller for Gem Maze.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment, so
//! the crate depends on macroquad without its default `audio` feature.
//!
//! Macroquad only reports key state on the thread that owns the window. The
//! render loop therefore copies the bound keys into [`KeyboardButtons`] every
//! frame, and the input sampler thread polls that shared copy through
//! [`ButtonPanel`].

use anyhow::Result;
use gem_maze_core::Color;
use gem_maze_rendering::{Frame, FrameUpdate, MatrixLayout, Presentation, RenderingBackend};
use gem_maze_system_input::{Button, ButtonPanel};
use glam::Vec2;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};

/// Keyboard keys bound to each controller button.
pub const KEY_BINDINGS: [(KeyCode, Button); 10] = [
    (KeyCode::Up, Button::Up),
    (KeyCode::W, Button::Up),
    (KeyCode::Down, Button::Down),
    (KeyCode::S, Button::Down),
    (KeyCode::Left, Button::Left),
    (KeyCode::A, Button::Left),
    (KeyCode::Right, Button::Right),
    (KeyCode::D, Button::Right),
    (KeyCode::Z, Button::A),
    (KeyCode::X, Button::B),
];

/// Controller buttons that a keyboard key is bound to.
pub fn buttons_for_key(key: KeyCode) -> impl Iterator<Item = Button> {
    KEY_BINDINGS
        .into_iter()
        .filter(move |&(bound, _)| bound == key)
        .map(|(_, button)| button)
}

/// Button state mirrored from the keyboard, shareable across threads.
///
/// Clones observe the same state.
#[derive(Clone, Debug, Default)]
pub struct KeyboardButtons {
    held: Arc<AtomicU8>,
}

impl KeyboardButtons {
    /// Creates a panel with every button released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a button as held or released.
    pub fn set_held(&self, button: Button, held: bool) {
        let bit = button_bit(button);
        if held {
            let _ = self.held.fetch_or(bit, Ordering::AcqRel);
        } else {
            let _ = self.held.fetch_and(!bit, Ordering::AcqRel);
        }
    }

    /// Releases every button.
    pub fn release_all(&self) {
        self.held.store(0, Ordering::Release);
    }

    fn poll_keyboard(&self) {
        let mut held = 0u8;
        for (key, button) in KEY_BINDINGS {
            if is_key_down(key) {
                held |= button_bit(button);
            }
        }
        self.held.store(held, Ordering::Release);
    }
}

impl ButtonPanel for KeyboardButtons {
    fn is_pressed(&self, button: Button) -> bool {
        self.held.load(Ordering::Acquire) & button_bit(button) != 0
    }
}

const fn button_bit(button: Button) -> u8 {
    match button {
        Button::Up => 1,
        Button::Down => 1 << 1,
        Button::Left => 1 << 2,
        Button::Right => 1 << 3,
        Button::A => 1 << 4,
        Button::B => 1 << 5,
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    buttons: KeyboardButtons,
}

impl MacroquadBackend {
    /// Creates a backend that mirrors the keyboard into `buttons`.
    #[must_use]
    pub fn new(buttons: KeyboardButtons) -> Self {
        Self {
            swap_interval: None,
            buttons,
        }
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut next_frame: F) -> Result<()>
    where
        F: FnMut(Duration) -> FrameUpdate + 'static,
    {
        let Self {
            swap_interval,
            buttons,
        } = self;

        let mut config = macroquad::window::Conf {
            window_title: presentation.window_title.clone(),
            window_width: 960,
            window_height: 640,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let background = to_macroquad_color(presentation.clear_color);
            let mut shown: Option<Frame> = None;

            loop {
                if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                    break;
                }
                buttons.poll_keyboard();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                match next_frame(frame_dt) {
                    FrameUpdate::Keep => {}
                    FrameUpdate::Show(frame) => shown = Some(frame),
                    FrameUpdate::Exit => break,
                }

                macroquad::window::clear_background(background);
                if let Some(frame) = &shown {
                    let screen = Vec2::new(
                        macroquad::window::screen_width(),
                        macroquad::window::screen_height(),
                    );
                    draw_frame(frame, &presentation.layout(screen));
                }

                macroquad::window::next_frame().await;
            }

            buttons.release_all();
            tracing::debug!("display closed");
        });

        Ok(())
    }
}

fn draw_frame(frame: &Frame, layout: &MatrixLayout) {
    for position in frame.grid().positions() {
        let Some(color) = frame.cell(position) else {
            continue;
        };
        let origin = layout.led_origin(position);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            layout.led_size,
            layout.led_size,
            to_macroquad_color(color),
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::from_rgba(color.red(), color.green(), color.blue(), 255)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_bits_are_distinct() {
        let buttons = [
            Button::Up,
            Button::Down,
            Button::Left,
            Button::Right,
            Button::A,
            Button::B,
        ];
        let combined = buttons.iter().fold(0u8, |acc, &button| {
            assert_eq!(acc & button_bit(button), 0);
            acc | button_bit(button)
        });
        assert_eq!(combined.count_ones(), 6);
    }

    #[test]
    fn colors_convert_to_opaque_macroquad_colors() {
        let converted = to_macroquad_color(Color::YELLOW);

        assert_eq!(converted.r, 1.0);
        assert!((converted.g - 150.0 / 255.0).abs() < 1e-6);
        assert_eq!(converted.b, 0.0);
        assert_eq!(converted.a, 1.0);
    }
}
