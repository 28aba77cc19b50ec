#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gem Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values that the
//! session paints onto the LED matrix. Systems such as enemy pursuit query
//! immutable snapshots and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Gem Maze.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the player advance a single step in the given direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that an enemy advance a single step, or hold its cell.
    StepEnemy {
        /// Identifier of the enemy attempting to move.
        enemy: EnemyId,
        /// Direction of travel, `None` when the enemy keeps its position.
        direction: Option<Direction>,
    },
    /// Completes the pause that follows an enemy reaching the player.
    ResolveHit,
    /// Rebuilds the level from its definition with fresh gems and full lives.
    RestartLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: Position,
        /// Cell the player occupies after moving.
        to: Position,
    },
    /// Reports that a wall rejected the player's step.
    PlayerBlocked {
        /// Cell the player still occupies.
        at: Position,
        /// Direction of the rejected step.
        direction: Direction,
    },
    /// Confirms that the player picked up a gem.
    GemCollected {
        /// Identifier of the collected gem.
        gem: GemId,
        /// Cell the gem occupies.
        at: Position,
        /// Number of gems found so far, including this one.
        found: u32,
        /// Number of gems placed in the level.
        total: u32,
    },
    /// Announces that every gem has been collected.
    LevelWon,
    /// Confirms that an enemy moved between two cells.
    EnemyMoved {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Cell the enemy occupied before moving.
        from: Position,
        /// Cell the enemy occupies after moving.
        to: Position,
    },
    /// Reports that an enemy ended its step on the cell it started from.
    EnemyHeld {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Cell the enemy still occupies.
        at: Position,
    },
    /// Reports that an enemy landed on the player and a life was lost.
    PlayerHit {
        /// Identifier of the enemy that reached the player.
        enemy: EnemyId,
        /// Lives left after the deduction.
        lives_remaining: u32,
    },
    /// Confirms that the player and all enemies returned to their spawns.
    LevelReset,
    /// Announces that the last life was lost.
    LivesExhausted,
    /// Confirms that the level was rebuilt from its definition.
    LevelRestarted,
}

/// Lifecycle of a single level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// Ticks are processed normally.
    Playing,
    /// An enemy reached the player; the world waits for [`Command::ResolveHit`].
    Resetting,
    /// Every gem was collected.
    LevelWon,
    /// No lives remain.
    LivesExhausted,
}

impl GameStatus {
    /// Reports whether no further ticks are processed in this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::LevelWon | Self::LivesExhausted)
    }
}

/// Cardinal movement directions shared by buttons, the player and enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction, ordered `+x`, `-x`, `+y`, `-y`.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    /// Unit offset applied to the column and row when stepping this way.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Unique identifier assigned to an enemy, equal to its index in spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a gem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GemId(u32);

impl GemId {
    /// Creates a new gem identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Chase strategy assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyBehavior {
    /// Steps in a uniformly random direction.
    Random,
    /// Closes the larger axis gap first, falling back to the other axis.
    Greedy,
    /// Follows the breadth-first distance field seeded at the player.
    Pathfinding,
}

/// Location of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two positions, ignoring wrap.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Static geometry of the LED matrix the game is played on.
///
/// Free movement wraps toroidally: leaving one edge re-enters at the opposite
/// edge, independently per axis. Breadth-first expansion uses [`Grid::neighbor`]
/// instead, which treats off-grid cells as invalid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Grid {
    width: u32,
    height: u32,
}

impl Grid {
    /// Creates a grid with the provided dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells covered by the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(0)
    }

    /// Reports whether the signed coordinate pair lies on the grid.
    #[must_use]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// Reports whether the position lies on the grid.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Applies the toroidal correction to a coordinate pair that is at most one
    /// cell past an edge.
    ///
    /// Coordinates below zero become the last index and coordinates past the
    /// last index become zero, independently per axis.
    #[must_use]
    pub fn wrap(&self, x: i64, y: i64) -> Position {
        Position::new(wrap_axis(x, self.width), wrap_axis(y, self.height))
    }

    /// Cell reached by a single wrapping step from `from`.
    #[must_use]
    pub fn step(&self, from: Position, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        self.wrap(
            i64::from(from.x) + i64::from(dx),
            i64::from(from.y) + i64::from(dy),
        )
    }

    /// Adjacent cell in the given direction, or `None` when it lies off-grid.
    #[must_use]
    pub fn neighbor(&self, from: Position, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        let x = i64::from(from.x) + i64::from(dx);
        let y = i64::from(from.y) + i64::from(dy);
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(Position::new(u32::try_from(x).ok()?, u32::try_from(y).ok()?))
    }

    /// Row-major offset of the position, if it lies on the grid.
    #[must_use]
    pub fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let row = usize::try_from(position.y).ok()?;
        let column = usize::try_from(position.x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Iterator over every cell in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }
}

fn wrap_axis(value: i64, extent: u32) -> u32 {
    let last = extent.saturating_sub(1);
    if value < 0 {
        last
    } else if value > i64::from(last) {
        0
    } else {
        u32::try_from(value).unwrap_or(0)
    }
}

/// Logical color of a single LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Unlit LED, also used as the background.
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);
    /// Enemy and hit-alert color.
    pub const RED: Color = Color::from_rgb(255, 0, 0);
    /// Player color.
    pub const YELLOW: Color = Color::from_rgb(255, 150, 0);
    /// Enemy and win color.
    pub const GREEN: Color = Color::from_rgb(0, 255, 0);
    /// Wall color.
    pub const BLUE: Color = Color::from_rgb(0, 0, 255);
    /// Enemy color.
    pub const PURPLE: Color = Color::from_rgb(180, 0, 255);
    /// Gem color.
    pub const WHITE: Color = Color::from_rgb(255, 255, 255);

    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}
