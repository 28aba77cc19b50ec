#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Gem Maze adapters.
//!
//! The game draws onto a fixed-size LED matrix through the [`LedMatrix`]
//! capability: many [`LedMatrix::set_cell`] writes followed by one
//! [`LedMatrix::present`]. [`FrameBuffer`] is the stock implementation; every
//! present snapshots the pending cells into a [`Frame`] and hands it to a
//! [`FrameSink`], which is either a channel into a windowed backend or an
//! in-memory recorder.

use anyhow::Result as AnyResult;
use gem_maze_core::{Color, Grid, Position};
use glam::Vec2;
use std::{sync::mpsc, time::Duration};
use thiserror::Error;

/// Colors assigned to the parts of the maze.
pub mod palette {
    use gem_maze_core::Color;

    /// Unlit cells.
    pub const BACKGROUND: Color = Color::BLACK;
    /// Full-screen flash shown while a hit is being resolved.
    pub const HIT_ALERT: Color = Color::RED;
    /// Full-screen fill shown once every gem is collected.
    pub const WIN: Color = Color::GREEN;
}

/// Errors raised while drawing to or presenting the LED matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// A write addressed a cell outside the matrix.
    #[error("cell ({x}, {y}) lies outside the {width}x{height} matrix")]
    CellOutOfRange {
        /// Column of the rejected cell.
        x: u32,
        /// Row of the rejected cell.
        y: u32,
        /// Number of columns on the matrix.
        width: u32,
        /// Number of rows on the matrix.
        height: u32,
    },
    /// The display consuming presented frames has gone away.
    #[error("display disconnected")]
    DisplayDisconnected,
}

/// Narrow drawing capability consumed by the game session.
pub trait LedMatrix {
    /// Geometry of the matrix.
    fn grid(&self) -> Grid;

    /// Writes a color for one cell, visible after the next [`LedMatrix::present`].
    fn set_cell(&mut self, position: Position, color: Color) -> Result<(), RenderingError>;

    /// Writes the same color to every cell.
    fn fill_all(&mut self, color: Color);

    /// Publishes every pending write at once.
    fn present(&mut self) -> Result<(), RenderingError>;
}

/// Immutable snapshot of every LED after a present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    grid: Grid,
    sequence: u64,
    cells: Vec<Color>,
}

impl Frame {
    /// Creates a frame with every cell set to `fill`.
    #[must_use]
    pub fn new(grid: Grid, fill: Color) -> Self {
        Self {
            grid,
            sequence: 0,
            cells: vec![fill; grid.cell_count()],
        }
    }

    /// Geometry of the frame.
    #[must_use]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Number of presents that happened before and including this frame.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Color of the provided cell.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<Color> {
        let index = self.grid.index(position)?;
        self.cells.get(index).copied()
    }

    /// Reports whether every cell shows the same color.
    #[must_use]
    pub fn is_filled_with(&self, color: Color) -> bool {
        self.cells.iter().all(|&cell| cell == color)
    }

    /// Renders the frame as text, one line per row.
    ///
    /// `.` background, `#` wall, `*` gem, `P` player, `R`/`G`/`S` red, green
    /// and purple enemies, `C` cyan, `?` anything else.
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let width = usize::try_from(self.grid.width()).unwrap_or(0);
        if width == 0 {
            return String::new();
        }

        self.cells
            .chunks(width)
            .map(|row| row.iter().map(|&color| glyph(color)).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn glyph(color: Color) -> char {
    match color {
        Color::BLACK => '.',
        Color::BLUE => '#',
        Color::WHITE => '*',
        Color::YELLOW => 'P',
        Color::RED => 'R',
        Color::GREEN => 'G',
        Color::PURPLE => 'S',
        _ => '?',
    }
}

/// Destination for presented frames.
pub trait FrameSink {
    /// Accepts a freshly presented frame.
    fn publish(&mut self, frame: Frame) -> Result<(), RenderingError>;
}

impl FrameSink for mpsc::Sender<Frame> {
    fn publish(&mut self, frame: Frame) -> Result<(), RenderingError> {
        self.send(frame)
            .map_err(|_| RenderingError::DisplayDisconnected)
    }
}

impl<S> FrameSink for &mut S
where
    S: FrameSink + ?Sized,
{
    fn publish(&mut self, frame: Frame) -> Result<(), RenderingError> {
        (**self).publish(frame)
    }
}

/// Sink that keeps every presented frame in memory.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    frames: Vec<Frame>,
}

impl FrameRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every frame received so far, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Most recently received frame.
    #[must_use]
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl FrameSink for FrameRecorder {
    fn publish(&mut self, frame: Frame) -> Result<(), RenderingError> {
        self.frames.push(frame);
        Ok(())
    }
}

/// [`LedMatrix`] that batches writes and publishes them to a [`FrameSink`].
#[derive(Debug)]
pub struct FrameBuffer<S> {
    pending: Frame,
    sink: S,
}

impl<S> FrameBuffer<S>
where
    S: FrameSink,
{
    /// Creates a dark frame buffer of the given size.
    #[must_use]
    pub fn new(grid: Grid, sink: S) -> Self {
        Self {
            pending: Frame::new(grid, palette::BACKGROUND),
            sink,
        }
    }

    /// Writes accumulated since construction, not yet presented.
    #[must_use]
    pub fn pending(&self) -> &Frame {
        &self.pending
    }

    /// Borrows the sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S> LedMatrix for FrameBuffer<S>
where
    S: FrameSink,
{
    fn grid(&self) -> Grid {
        self.pending.grid
    }

    fn set_cell(&mut self, position: Position, color: Color) -> Result<(), RenderingError> {
        let grid = self.pending.grid;
        let slot = grid
            .index(position)
            .and_then(|index| self.pending.cells.get_mut(index))
            .ok_or(RenderingError::CellOutOfRange {
                x: position.x(),
                y: position.y(),
                width: grid.width(),
                height: grid.height(),
            })?;
        *slot = color;
        Ok(())
    }

    fn fill_all(&mut self, color: Color) {
        self.pending.cells.fill(color);
    }

    fn present(&mut self) -> Result<(), RenderingError> {
        self.pending.sequence = self.pending.sequence.saturating_add(1);
        self.sink.publish(self.pending.clone())
    }
}

/// Update returned to a backend on every displayed frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameUpdate {
    /// Keep showing the current frame.
    Keep,
    /// Replace the displayed frame.
    Show(Frame),
    /// Close the display.
    Exit,
}

/// Window and layout parameters for drawing the LED matrix on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Color drawn behind the matrix.
    pub clear_color: Color,
    /// Geometry of the matrix.
    pub grid: Grid,
    /// Fraction of each cell left dark between neighboring LEDs.
    pub cell_gap: f32,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, grid: Grid) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color: Color::from_rgb(16, 16, 16),
            grid,
            cell_gap: 0.1,
        }
    }

    /// Fits the matrix into a screen of the provided size, keeping cells square.
    #[must_use]
    pub fn layout(&self, screen: Vec2) -> MatrixLayout {
        let columns = self.grid.width() as f32;
        let rows = self.grid.height() as f32;
        if columns <= 0.0 || rows <= 0.0 {
            return MatrixLayout {
                origin: Vec2::ZERO,
                cell_step: 0.0,
                led_size: 0.0,
            };
        }

        let cell_step = (screen.x / columns).min(screen.y / rows).max(0.0);
        let extent = Vec2::new(columns, rows) * cell_step;
        let origin = ((screen - extent) * 0.5).max(Vec2::ZERO);
        let led_size = cell_step * (1.0 - self.cell_gap.clamp(0.0, 1.0));

        MatrixLayout {
            origin,
            cell_step,
            led_size,
        }
    }
}

/// Screen-space placement of the matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatrixLayout {
    /// Top-left corner of the matrix.
    pub origin: Vec2,
    /// Distance between the origins of two neighboring cells.
    pub cell_step: f32,
    /// Side length of the lit square drawn for each cell.
    pub led_size: f32,
}

impl MatrixLayout {
    /// Top-left corner of the lit square for the provided cell.
    #[must_use]
    pub fn led_origin(&self, position: Position) -> Vec2 {
        let inset = (self.cell_step - self.led_size) * 0.5;
        self.origin
            + Vec2::new(position.x() as f32, position.y() as f32) * self.cell_step
            + Vec2::splat(inset)
    }
}

/// Rendering backend capable of displaying presented frames.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// `next_frame` is called once per displayed frame with the elapsed frame
    /// time and decides whether the picture changes or the window closes.
    fn run<F>(self, presentation: Presentation, next_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration) -> FrameUpdate + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cell_rejects_positions_outside_the_matrix() {
        let mut buffer = FrameBuffer::new(Grid::new(12, 8), FrameRecorder::new());

        let error = buffer
            .set_cell(Position::new(12, 0), Color::BLUE)
            .expect_err("column 12 is off the matrix");

        assert_eq!(
            error,
            RenderingError::CellOutOfRange {
                x: 12,
                y: 0,
                width: 12,
                height: 8,
            }
        );
    }

    #[test]
    fn writes_stay_pending_until_present() {
        let mut recorder = FrameRecorder::new();
        let mut buffer = FrameBuffer::new(Grid::new(3, 2), &mut recorder);

        buffer
            .set_cell(Position::new(1, 1), Color::YELLOW)
            .expect("cell on the matrix");
        assert_eq!(
            buffer.pending().cell(Position::new(1, 1)),
            Some(Color::YELLOW)
        );
        buffer.present().expect("recorder accepts frames");
        buffer.fill_all(palette::WIN);
        buffer.present().expect("recorder accepts frames");
        drop(buffer);

        let frames = recorder.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].sequence(), 1);
        assert_eq!(frames[0].to_ascii(), "...\n.P.");
        assert_eq!(frames[1].sequence(), 2);
        assert!(frames[1].is_filled_with(palette::WIN));
    }

    #[test]
    fn present_reports_a_closed_display() {
        let (sender, receiver) = mpsc::channel();
        let mut buffer = FrameBuffer::new(Grid::new(2, 2), sender);
        drop(receiver);

        assert_eq!(buffer.present(), Err(RenderingError::DisplayDisconnected));
    }

    #[test]
    fn channel_sink_delivers_frames_in_order() {
        let (sender, receiver) = mpsc::channel();
        let mut buffer = FrameBuffer::new(Grid::new(2, 1), sender);

        buffer.present().expect("receiver alive");
        buffer
            .set_cell(Position::new(0, 0), Color::WHITE)
            .expect("cell on the matrix");
        buffer.present().expect("receiver alive");

        let received: Vec<_> = receiver.try_iter().map(|frame| frame.to_ascii()).collect();
        assert_eq!(received, vec!["..".to_owned(), "*.".to_owned()]);
    }

    #[test]
    fn ascii_marks_unknown_colors() {
        let mut frame = Frame::new(Grid::new(2, 1), Color::from_rgb(1, 2, 3));
        frame.cells[1] = Color::PURPLE;

        assert_eq!(frame.to_ascii(), "?S");
    }

    #[test]
    fn layout_centres_square_cells() {
        let presentation = Presentation::new("Gem Maze", Grid::new(12, 8));
        let layout = presentation.layout(Vec2::new(1200.0, 1000.0));

        assert_eq!(layout.cell_step, 100.0);
        assert_eq!(layout.origin, Vec2::new(0.0, 100.0));
        assert!((layout.led_size - 90.0).abs() < 1e-4);

        let led = layout.led_origin(Position::new(1, 0));
        assert!((led - Vec2::new(105.0, 105.0)).length() < 1e-4);
    }

    #[test]
    fn layout_of_empty_grid_is_degenerate() {
        let presentation = Presentation::new("Gem Maze", Grid::new(0, 0));
        let layout = presentation.layout(Vec2::new(640.0, 480.0));

        assert_eq!(layout.cell_step, 0.0);
        assert_eq!(layout.origin, Vec2::ZERO);
    }
}
