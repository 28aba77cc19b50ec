#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy pursuit system that plans one step per enemy and tick.
//!
//! Every enemy follows one of three strategies: a uniformly random walk, a
//! greedy walk that closes the larger axis gap first and falls back to the
//! other axis once, and a pathfinding walk that descends a breadth-first
//! distance field seeded at the player. The system only reads world views and
//! answers with [`Command::StepEnemy`] values; the world performs the wall
//! rollback and the hit test when it applies them.

mod navigation;

pub use navigation::DistanceField;

use gem_maze_core::{Command, Direction, EnemyBehavior, Grid, Position};
use gem_maze_world::query::{EnemySnapshot, EnemyView, WallView};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the pursuit system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: Option<u64>,
}

impl Config {
    /// Seeds random walks deterministically.
    #[must_use]
    pub const fn seeded(rng_seed: u64) -> Self {
        Self {
            rng_seed: Some(rng_seed),
        }
    }

    /// Seeds random walks from operating system entropy.
    #[must_use]
    pub const fn from_entropy() -> Self {
        Self { rng_seed: None }
    }
}

/// Pure system that turns enemy snapshots into step commands.
#[derive(Debug)]
pub struct Pursuit {
    rng: ChaCha8Rng,
    field: DistanceField,
}

impl Pursuit {
    /// Creates a new pursuit system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rng,
            field: DistanceField::default(),
        }
    }

    /// Emits one [`Command::StepEnemy`] per enemy, in move order.
    ///
    /// Every plan is made against the same player position; enemies never
    /// block each other, so planning them all up front is equivalent to moving
    /// them one after the other.
    pub fn handle(
        &mut self,
        enemies: &EnemyView,
        player: Position,
        walls: WallView<'_>,
        out: &mut Vec<Command>,
    ) {
        for enemy in enemies.iter() {
            let direction = self.plan(enemy, player, walls);
            out.push(Command::StepEnemy {
                enemy: enemy.id,
                direction,
            });
        }
    }

    fn plan(
        &mut self,
        enemy: &EnemySnapshot,
        player: Position,
        walls: WallView<'_>,
    ) -> Option<Direction> {
        match enemy.behavior {
            EnemyBehavior::Random => Some(random_direction(&mut self.rng)),
            EnemyBehavior::Greedy => greedy_direction(enemy.position, player, walls),
            EnemyBehavior::Pathfinding => self.pathfinding_direction(enemy, player, walls),
        }
    }

    fn pathfinding_direction(
        &mut self,
        enemy: &EnemySnapshot,
        player: Position,
        walls: WallView<'_>,
    ) -> Option<Direction> {
        self.field
            .rebuild_with(walls.grid(), player, Some(enemy.position), |cell| {
                walls.is_wall(cell)
            });

        if self.field.distance(enemy.position).is_none() {
            tracing::debug!(
                enemy = enemy.id.get(),
                x = enemy.position.x(),
                y = enemy.position.y(),
                "enemy cannot reach the player, holding position"
            );
            return None;
        }

        self.field.descend(enemy.position)
    }
}

fn random_direction<R: Rng>(rng: &mut R) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

/// Picks the greedy step for an enemy at `from` chasing the player at `target`.
///
/// The axis with the strictly larger gap is tried first, so ties try the row
/// axis first. On an axis where both coordinates match the step is taken in
/// the increasing direction. A wall on the first axis flips to the other axis
/// once; if that is walled too the enemy holds.
#[must_use]
pub fn greedy_direction(
    from: Position,
    target: Position,
    walls: WallView<'_>,
) -> Option<Direction> {
    let grid = walls.grid();
    let horizontal = if target.x() < from.x() {
        Direction::Left
    } else {
        Direction::Right
    };
    let vertical = if target.y() < from.y() {
        Direction::Up
    } else {
        Direction::Down
    };

    let change_x = from.x().abs_diff(target.x()) > from.y().abs_diff(target.y());
    let (primary, secondary) = if change_x {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    };

    if is_open(grid, walls, from, primary) {
        Some(primary)
    } else if is_open(grid, walls, from, secondary) {
        Some(secondary)
    } else {
        None
    }
}

fn is_open(grid: Grid, walls: WallView<'_>, from: Position, direction: Direction) -> bool {
    !walls.is_wall(grid.step(from, direction))
}
