#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Gem Maze.
//!
//! The world owns the player, the static wall set, the gems, every enemy, the
//! remaining lives and the level status. It only changes through [`apply`],
//! which validates each [`Command`] against the current status and reports the
//! outcome as [`Event`] values.

mod level;

pub use level::{EnemySpawn, Level, LevelError, Wall};

use gem_maze_core::{
    Color, Command, Direction, EnemyBehavior, EnemyId, Event, GameStatus, GemId, Grid, Position,
    WELCOME_BANNER,
};

/// Number of lives a session starts with unless configured otherwise.
pub const DEFAULT_LIVES: u32 = 3;

/// Represents the authoritative Gem Maze world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    level: Level,
    walls: WallMap,
    gems: Vec<Gem>,
    player: Player,
    enemies: Vec<Enemy>,
    starting_lives: u32,
    lives: u32,
    status: GameStatus,
}

impl World {
    /// Creates a world for the provided level with the given number of lives.
    ///
    /// A world created with zero lives starts out exhausted.
    #[must_use]
    pub fn new(level: Level, lives: u32) -> Self {
        let walls = WallMap::new(level.grid(), level.walls());
        let mut world = Self {
            banner: WELCOME_BANNER,
            walls,
            gems: Vec::new(),
            player: Player::spawn_at(level.player_spawn()),
            enemies: Vec::new(),
            starting_lives: lives,
            lives,
            status: GameStatus::Playing,
            level,
        };
        world.rebuild();
        world
    }

    fn rebuild(&mut self) {
        self.gems = (0u32..)
            .zip(self.level.gems())
            .map(|(index, &position)| Gem {
                id: GemId::new(index),
                position,
                collected: false,
            })
            .collect();
        self.player = Player::spawn_at(self.level.player_spawn());
        self.enemies = (0u32..)
            .zip(self.level.enemies())
            .map(|(index, spawn)| Enemy::from_spawn(EnemyId::new(index), spawn))
            .collect();
        self.lives = self.starting_lives;
        self.status = if self.lives == 0 {
            GameStatus::LivesExhausted
        } else {
            GameStatus::Playing
        };
    }

    fn total_gems(&self) -> u32 {
        u32::try_from(self.gems.len()).unwrap_or(u32::MAX)
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let grid = self.level.grid();
        let from = self.player.position;
        let candidate = grid.step(from, direction);

        if self.walls.is_wall(candidate) {
            out_events.push(Event::PlayerBlocked {
                at: from,
                direction,
            });
        } else {
            self.player.position = candidate;
            out_events.push(Event::PlayerMoved {
                from,
                to: candidate,
            });
            self.collect_gem_at(candidate, out_events);
        }

        if self.player.found_gems == self.total_gems() {
            self.status = GameStatus::LevelWon;
            out_events.push(Event::LevelWon);
        }
    }

    fn collect_gem_at(&mut self, position: Position, out_events: &mut Vec<Event>) {
        let total = self.total_gems();
        let Some(gem) = self.gems.iter_mut().find(|gem| gem.position == position) else {
            return;
        };

        if gem.collected {
            return;
        }

        gem.collected = true;
        self.player.found_gems += 1;
        out_events.push(Event::GemCollected {
            gem: gem.id,
            at: position,
            found: self.player.found_gems,
            total,
        });
    }

    fn step_enemy(
        &mut self,
        enemy_id: EnemyId,
        direction: Option<Direction>,
        out_events: &mut Vec<Event>,
    ) {
        let grid = self.level.grid();
        let player = self.player.position;
        let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id == enemy_id) else {
            return;
        };

        enemy.hit_player = false;
        let from = enemy.position;
        let to = match direction {
            Some(direction) => {
                let candidate = grid.step(from, direction);
                if self.walls.is_wall(candidate) {
                    from
                } else {
                    candidate
                }
            }
            None => from,
        };
        enemy.position = to;

        if to == from {
            out_events.push(Event::EnemyHeld {
                enemy: enemy_id,
                at: to,
            });
        } else {
            out_events.push(Event::EnemyMoved {
                enemy: enemy_id,
                from,
                to,
            });
        }

        if to == player {
            enemy.hit_player = true;
            self.lives = self.lives.saturating_sub(1);
            self.status = GameStatus::Resetting;
            out_events.push(Event::PlayerHit {
                enemy: enemy_id,
                lives_remaining: self.lives,
            });
        }
    }

    fn resolve_hit(&mut self, out_events: &mut Vec<Event>) {
        if self.lives == 0 {
            self.status = GameStatus::LivesExhausted;
            out_events.push(Event::LivesExhausted);
            return;
        }

        self.player.position = self.player.spawn;
        for enemy in &mut self.enemies {
            enemy.position = enemy.spawn;
            enemy.hit_player = false;
        }
        self.status = GameStatus::Playing;
        out_events.push(Event::LevelReset);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MovePlayer { direction } => {
            if world.status == GameStatus::Playing {
                world.move_player(direction, out_events);
            }
        }
        Command::StepEnemy { enemy, direction } => {
            if world.status == GameStatus::Playing {
                world.step_enemy(enemy, direction, out_events);
            }
        }
        Command::ResolveHit => {
            if world.status == GameStatus::Resetting {
                world.resolve_hit(out_events);
            }
        }
        Command::RestartLevel => {
            world.rebuild();
            out_events.push(Event::LevelRestarted);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Enemy, Gem, Wall, WallMap, World};
    use gem_maze_core::{Color, EnemyBehavior, EnemyId, GameStatus, Grid, Position};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Geometry of the level.
    #[must_use]
    pub fn grid(world: &World) -> Grid {
        world.level.grid()
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Lives left before the game is lost.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            spawn: world.player.spawn,
            found_gems: world.player.found_gems,
            color: world.level.player_color(),
        }
    }

    /// Number of gems placed in the level.
    #[must_use]
    pub fn total_gems(world: &World) -> u32 {
        world.total_gems()
    }

    /// Every gem, collected or not, in definition order.
    #[must_use]
    pub fn gems(world: &World) -> &[Gem] {
        &world.gems
    }

    /// Gem occupying the provided cell, if any.
    #[must_use]
    pub fn gem_at(world: &World, position: Position) -> Option<&Gem> {
        world.gems.iter().find(|gem| gem.position == position)
    }

    /// Color uncollected gems are drawn in.
    #[must_use]
    pub fn gem_color(world: &World) -> Color {
        world.level.gem_color()
    }

    /// Every wall in definition order.
    #[must_use]
    pub fn walls(world: &World) -> &[Wall] {
        world.level.walls()
    }

    /// Exposes a read-only view of the dense wall occupancy.
    #[must_use]
    pub fn wall_view(world: &World) -> WallView<'_> {
        WallView {
            walls: &world.walls,
        }
    }

    /// Captures a read-only view of the enemies in move order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView {
            snapshots: world.enemies.iter().map(Enemy::snapshot).collect(),
        }
    }

    /// Immutable representation of the player's state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Cell currently occupied by the player.
        pub position: Position,
        /// Cell the player returns to after a hit.
        pub spawn: Position,
        /// Number of gems collected so far.
        pub found_gems: u32,
        /// Color the player is drawn in.
        pub color: Color,
    }

    /// Immutable representation of a single enemy's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EnemySnapshot {
        /// Unique identifier assigned to the enemy.
        pub id: EnemyId,
        /// Cell currently occupied by the enemy.
        pub position: Position,
        /// Cell the enemy returns to after a hit.
        pub spawn: Position,
        /// Chase strategy the enemy follows.
        pub behavior: EnemyBehavior,
        /// Color the enemy is drawn in.
        pub color: Color,
        /// Whether the enemy's latest step ended on the player.
        pub hit_player: bool,
    }

    /// Read-only snapshot describing every enemy in move order.
    #[derive(Clone, Debug, Default)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured enemy snapshots in move order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Snapshot of the enemy with the provided identifier.
        #[must_use]
        pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
            self.snapshots.iter().find(|snapshot| snapshot.id == id)
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Read-only view into the dense wall occupancy grid.
    #[derive(Clone, Copy, Debug)]
    pub struct WallView<'a> {
        walls: &'a WallMap,
    }

    impl WallView<'_> {
        /// Reports whether a wall occupies the provided cell.
        #[must_use]
        pub fn is_wall(&self, position: Position) -> bool {
            self.walls.is_wall(position)
        }

        /// Geometry the wall set was laid out on.
        #[must_use]
        pub fn grid(&self) -> Grid {
            self.walls.grid
        }
    }
}

/// Collectable gem. Once collected it stays collected until the level restarts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gem {
    id: GemId,
    position: Position,
    collected: bool,
}

impl Gem {
    /// Cell the gem occupies.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Whether the player has picked the gem up.
    #[must_use]
    pub const fn is_collected(&self) -> bool {
        self.collected
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: Position,
    spawn: Position,
    found_gems: u32,
}

impl Player {
    fn spawn_at(spawn: Position) -> Self {
        Self {
            position: spawn,
            spawn,
            found_gems: 0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Enemy {
    id: EnemyId,
    position: Position,
    spawn: Position,
    behavior: EnemyBehavior,
    color: Color,
    hit_player: bool,
}

impl Enemy {
    fn from_spawn(id: EnemyId, spawn: &EnemySpawn) -> Self {
        Self {
            id,
            position: spawn.position,
            spawn: spawn.position,
            behavior: spawn.behavior,
            color: spawn.color,
            hit_player: false,
        }
    }

    fn snapshot(&self) -> query::EnemySnapshot {
        query::EnemySnapshot {
            id: self.id,
            position: self.position,
            spawn: self.spawn,
            behavior: self.behavior,
            color: self.color,
            hit_player: self.hit_player,
        }
    }
}

#[derive(Clone, Debug)]
struct WallMap {
    grid: Grid,
    cells: Vec<bool>,
}

impl WallMap {
    fn new(grid: Grid, walls: &[Wall]) -> Self {
        let mut cells = vec![false; grid.cell_count()];
        for wall in walls {
            if let Some(index) = grid.index(wall.position()) {
                cells[index] = true;
            }
        }
        Self { grid, cells }
    }

    fn is_wall(&self, position: Position) -> bool {
        self.grid
            .index(position)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }
}
