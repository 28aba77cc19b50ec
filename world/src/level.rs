//! Level definitions: the static layout a world is built from.

use std::collections::HashSet;

use gem_maze_core::{Color, EnemyBehavior, Grid, Position};
use thiserror::Error;

const CLASSIC_WIDTH: u32 = 12;
const CLASSIC_HEIGHT: u32 = 8;

const CLASSIC_WALLS: [(u32, u32); 52] = [
    (0, 0),
    (1, 0),
    (2, 0),
    (3, 0),
    (4, 0),
    (5, 0),
    (6, 0),
    (7, 0),
    (8, 0),
    (9, 0),
    (10, 0),
    (11, 0),
    (3, 1),
    (7, 1),
    (0, 2),
    (1, 2),
    (3, 2),
    (5, 2),
    (9, 2),
    (11, 2),
    (0, 3),
    (5, 3),
    (6, 3),
    (8, 3),
    (9, 3),
    (11, 3),
    (0, 4),
    (2, 4),
    (3, 4),
    (5, 4),
    (6, 4),
    (11, 4),
    (0, 5),
    (2, 5),
    (6, 5),
    (8, 5),
    (10, 5),
    (11, 5),
    (4, 6),
    (8, 6),
    (0, 7),
    (1, 7),
    (2, 7),
    (3, 7),
    (4, 7),
    (5, 7),
    (6, 7),
    (7, 7),
    (8, 7),
    (9, 7),
    (10, 7),
    (11, 7),
];

const CLASSIC_GEMS: [(u32, u32); 37] = [
    (1, 1),
    (2, 1),
    (4, 1),
    (5, 1),
    (6, 1),
    (8, 1),
    (9, 1),
    (10, 1),
    (2, 2),
    (4, 2),
    (7, 2),
    (8, 2),
    (10, 2),
    (1, 3),
    (2, 3),
    (3, 3),
    (4, 3),
    (7, 3),
    (10, 3),
    (1, 4),
    (4, 4),
    (7, 4),
    (8, 4),
    (9, 4),
    (1, 5),
    (3, 5),
    (4, 5),
    (7, 5),
    (9, 5),
    (1, 6),
    (2, 6),
    (3, 6),
    (5, 6),
    (6, 6),
    (7, 6),
    (9, 6),
    (10, 6),
];

/// Reasons a level definition is rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The grid has no cells.
    #[error("level grid must have at least one cell (received {width}x{height})")]
    EmptyGrid {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// A wall, gem or spawn lies outside the grid.
    #[error("cell ({}, {}) lies outside the level grid", .position.x(), .position.y())]
    OutOfBounds {
        /// Offending cell.
        position: Position,
    },
    /// Two walls share a cell.
    #[error("more than one wall occupies ({}, {})", .position.x(), .position.y())]
    DuplicateWall {
        /// Offending cell.
        position: Position,
    },
    /// Two gems share a cell.
    #[error("more than one gem occupies ({}, {})", .position.x(), .position.y())]
    DuplicateGem {
        /// Offending cell.
        position: Position,
    },
    /// A gem was placed inside a wall.
    #[error("gem at ({}, {}) is inside a wall", .position.x(), .position.y())]
    GemOnWall {
        /// Offending cell.
        position: Position,
    },
    /// A gem was placed under the player spawn.
    #[error("gem at ({}, {}) sits on the player spawn", .position.x(), .position.y())]
    GemOnSpawn {
        /// Offending cell.
        position: Position,
    },
    /// The player or an enemy spawns inside a wall.
    #[error("spawn at ({}, {}) is inside a wall", .position.x(), .position.y())]
    SpawnOnWall {
        /// Offending cell.
        position: Position,
    },
    /// A text map contains no player glyph.
    #[error("level map has no player spawn")]
    MissingPlayer,
    /// A text map contains more than one player glyph.
    #[error("level map has more than one player spawn")]
    MultiplePlayers,
    /// A text map row differs in length from the first row.
    #[error("level map row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A text map contains a character with no meaning.
    #[error("unknown level glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Column of the character.
        x: u32,
        /// Row of the character.
        y: u32,
    },
}

/// Immovable obstacle drawn in its own color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Wall {
    position: Position,
    color: Color,
}

impl Wall {
    /// Creates a wall at the provided cell.
    #[must_use]
    pub const fn new(position: Position, color: Color) -> Self {
        Self { position, color }
    }

    /// Cell occupied by the wall.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Color the wall is drawn in.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }
}

/// Starting cell, strategy and appearance of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemySpawn {
    /// Cell the enemy starts on and returns to after a hit.
    pub position: Position,
    /// Chase strategy the enemy follows.
    pub behavior: EnemyBehavior,
    /// Color the enemy is drawn in.
    pub color: Color,
}

impl EnemySpawn {
    /// Creates a new enemy spawn.
    #[must_use]
    pub const fn new(position: Position, behavior: EnemyBehavior, color: Color) -> Self {
        Self {
            position,
            behavior,
            color,
        }
    }
}

/// Validated static layout of a single level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    grid: Grid,
    walls: Vec<Wall>,
    gems: Vec<Position>,
    gem_color: Color,
    player_spawn: Position,
    player_color: Color,
    enemies: Vec<EnemySpawn>,
}

impl Level {
    /// Validates and assembles a level.
    ///
    /// Gems and the player are drawn in the classic white and yellow.
    pub fn new(
        grid: Grid,
        walls: Vec<Wall>,
        gems: Vec<Position>,
        player_spawn: Position,
        enemies: Vec<EnemySpawn>,
    ) -> Result<Self, LevelError> {
        if grid.cell_count() == 0 {
            return Err(LevelError::EmptyGrid {
                width: grid.width(),
                height: grid.height(),
            });
        }

        let mut wall_cells = HashSet::with_capacity(walls.len());
        for wall in &walls {
            let position = wall.position();
            ensure_contains(grid, position)?;
            if !wall_cells.insert(position) {
                return Err(LevelError::DuplicateWall { position });
            }
        }

        ensure_contains(grid, player_spawn)?;
        if wall_cells.contains(&player_spawn) {
            return Err(LevelError::SpawnOnWall {
                position: player_spawn,
            });
        }

        let mut gem_cells = HashSet::with_capacity(gems.len());
        for &position in &gems {
            ensure_contains(grid, position)?;
            if wall_cells.contains(&position) {
                return Err(LevelError::GemOnWall { position });
            }
            if position == player_spawn {
                return Err(LevelError::GemOnSpawn { position });
            }
            if !gem_cells.insert(position) {
                return Err(LevelError::DuplicateGem { position });
            }
        }

        for spawn in &enemies {
            ensure_contains(grid, spawn.position)?;
            if wall_cells.contains(&spawn.position) {
                return Err(LevelError::SpawnOnWall {
                    position: spawn.position,
                });
            }
        }

        Ok(Self {
            grid,
            walls,
            gems,
            gem_color: Color::WHITE,
            player_spawn,
            player_color: Color::YELLOW,
            enemies,
        })
    }

    /// Parses a text map, one string per row.
    ///
    /// `#` is a wall, `*` a gem, `P` the player, `R`, `G` and `S` random,
    /// greedy and pathfinding enemies, `.` or a space an empty cell. Enemies
    /// are listed in row-major order and colored red, green and purple by
    /// strategy.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, LevelError> {
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let width = rows
            .first()
            .map_or(0, |row| u32::try_from(row.chars().count()).unwrap_or(u32::MAX));

        let mut walls = Vec::new();
        let mut gems = Vec::new();
        let mut enemies = Vec::new();
        let mut player = None;

        for (y, row) in (0u32..).zip(rows) {
            let found = u32::try_from(row.chars().count()).unwrap_or(u32::MAX);
            if found != width {
                return Err(LevelError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }

            for (x, glyph) in (0u32..).zip(row.chars()) {
                let position = Position::new(x, y);
                match glyph {
                    '#' => walls.push(Wall::new(position, Color::BLUE)),
                    '*' => gems.push(position),
                    'P' => {
                        if player.replace(position).is_some() {
                            return Err(LevelError::MultiplePlayers);
                        }
                    }
                    'R' => enemies.push(EnemySpawn::new(
                        position,
                        EnemyBehavior::Random,
                        Color::RED,
                    )),
                    'G' => enemies.push(EnemySpawn::new(
                        position,
                        EnemyBehavior::Greedy,
                        Color::GREEN,
                    )),
                    'S' => enemies.push(EnemySpawn::new(
                        position,
                        EnemyBehavior::Pathfinding,
                        Color::PURPLE,
                    )),
                    '.' | ' ' => {}
                    glyph => return Err(LevelError::UnknownGlyph { glyph, x, y }),
                }
            }
        }

        let player_spawn = player.ok_or(LevelError::MissingPlayer)?;
        Self::new(
            Grid::new(width, height),
            walls,
            gems,
            player_spawn,
            enemies,
        )
    }

    /// The original 12×8 maze with 37 gems and one enemy of each strategy.
    #[must_use]
    pub fn classic() -> Self {
        Self {
            grid: Grid::new(CLASSIC_WIDTH, CLASSIC_HEIGHT),
            walls: CLASSIC_WALLS
                .iter()
                .map(|&(x, y)| Wall::new(Position::new(x, y), Color::BLUE))
                .collect(),
            gems: CLASSIC_GEMS
                .iter()
                .map(|&(x, y)| Position::new(x, y))
                .collect(),
            gem_color: Color::WHITE,
            player_spawn: Position::new(0, 1),
            player_color: Color::YELLOW,
            enemies: vec![
                EnemySpawn::new(Position::new(6, 2), EnemyBehavior::Random, Color::RED),
                EnemySpawn::new(Position::new(5, 5), EnemyBehavior::Greedy, Color::GREEN),
                EnemySpawn::new(
                    Position::new(10, 4),
                    EnemyBehavior::Pathfinding,
                    Color::PURPLE,
                ),
            ],
        }
    }

    /// Geometry of the level.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// Walls in definition order.
    #[must_use]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Gem cells in definition order.
    #[must_use]
    pub fn gems(&self) -> &[Position] {
        &self.gems
    }

    /// Color uncollected gems are drawn in.
    #[must_use]
    pub const fn gem_color(&self) -> Color {
        self.gem_color
    }

    /// Cell the player starts on and returns to after a hit.
    #[must_use]
    pub const fn player_spawn(&self) -> Position {
        self.player_spawn
    }

    /// Color the player is drawn in.
    #[must_use]
    pub const fn player_color(&self) -> Color {
        self.player_color
    }

    /// Enemy spawns in move order.
    #[must_use]
    pub fn enemies(&self) -> &[EnemySpawn] {
        &self.enemies
    }
}

fn ensure_contains(grid: Grid, position: Position) -> Result<(), LevelError> {
    if grid.contains(position) {
        Ok(())
    } else {
        Err(LevelError::OutOfBounds { position })
    }
}
