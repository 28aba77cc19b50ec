//! Breadth-first distance field used by pathfinding enemies.

use std::collections::VecDeque;

use gem_maze_core::{Direction, Grid, Position};

/// Dense distance grid seeded from a single origin cell.
///
/// Distances count unit steps from the origin without wrapping around the grid
/// edges and default to `u16::MAX` for cells that were never reached, so
/// callers can distinguish walls and unexplored cells from traversable ones.
#[derive(Clone, Debug, Default)]
pub struct DistanceField {
    grid: Grid,
    distances: Vec<u16>,
    queue: VecDeque<Position>,
}

impl DistanceField {
    /// Rebuilds the distances using a breadth-first search from `origin`.
    ///
    /// Cells are dequeued in non-decreasing distance order. When `stop_at` is
    /// provided the search ends as soon as that cell is dequeued, leaving the
    /// rest of the grid partially explored.
    pub fn rebuild_with<F>(
        &mut self,
        grid: Grid,
        origin: Position,
        stop_at: Option<Position>,
        mut is_blocked: F,
    ) where
        F: FnMut(Position) -> bool,
    {
        let cell_count = grid.cell_count();
        if self.distances.len() != cell_count {
            self.distances = vec![u16::MAX; cell_count];
        } else {
            self.distances.fill(u16::MAX);
        }
        self.grid = grid;
        self.queue.clear();

        let Some(origin_index) = grid.index(origin) else {
            return;
        };
        if is_blocked(origin) {
            return;
        }

        self.distances[origin_index] = 0;
        self.queue.push_back(origin);

        while let Some(cell) = self.queue.pop_front() {
            if Some(cell) == stop_at {
                break;
            }

            let Some(current_index) = grid.index(cell) else {
                continue;
            };
            let current_distance = self.distances[current_index];

            if current_distance >= u16::MAX.saturating_sub(1) {
                continue;
            }

            let next_distance = current_distance + 1;

            for direction in Direction::ALL {
                let Some(neighbor) = grid.neighbor(cell, direction) else {
                    continue;
                };
                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] != u16::MAX {
                    continue;
                }

                if is_blocked(neighbor) {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                self.queue.push_back(neighbor);
            }
        }
    }

    /// Distance recorded for the provided cell, if it was reached.
    #[must_use]
    pub fn distance(&self, position: Position) -> Option<u16> {
        let index = self.grid.index(position)?;
        self.distances
            .get(index)
            .copied()
            .filter(|&distance| distance != u16::MAX)
    }

    /// Direction of the neighbor with the strictly smallest distance.
    ///
    /// Neighbors are scanned `+x`, `-x`, `+y`, `-y`; a later neighbor replaces
    /// the current choice only when it is strictly closer. Returns `None` when
    /// `from` was never reached or no neighbor improves on it.
    #[must_use]
    pub fn descend(&self, from: Position) -> Option<Direction> {
        let mut best = self.distance(from)?;
        let mut choice = None;

        for direction in Direction::ALL {
            let Some(neighbor) = self.grid.neighbor(from, direction) else {
                continue;
            };
            let Some(distance) = self.distance(neighbor) else {
                continue;
            };
            if distance < best {
                best = distance;
                choice = Some(direction);
            }
        }

        choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rebuild_with_sets_origin_to_zero() {
        let mut field = DistanceField::default();

        field.rebuild_with(Grid::new(3, 4), Position::new(1, 2), None, |_| false);

        assert_eq!(field.distance(Position::new(1, 2)), Some(0));
        assert_eq!(field.distance(Position::new(1, 1)), Some(1));
        assert_eq!(field.distance(Position::new(1, 0)), Some(2));
        assert_eq!(field.distance(Position::new(0, 0)), Some(3));
    }

    #[test]
    fn rebuild_with_respects_walls() {
        let mut field = DistanceField::default();
        let wall = Position::new(1, 1);

        field.rebuild_with(Grid::new(3, 4), Position::new(1, 2), None, |cell| {
            cell == wall
        });

        assert_eq!(field.distance(wall), None);
        assert_eq!(field.distance(Position::new(1, 0)), Some(4));
        assert_eq!(field.distance(Position::new(0, 1)), Some(2));
    }

    #[test]
    fn rebuild_with_does_not_wrap_around_edges() {
        let mut field = DistanceField::default();

        field.rebuild_with(Grid::new(5, 1), Position::new(0, 0), None, |_| false);

        assert_eq!(field.distance(Position::new(4, 0)), Some(4));
    }

    #[test]
    fn rebuild_with_stops_once_target_is_dequeued() {
        let mut field = DistanceField::default();

        field.rebuild_with(
            Grid::new(6, 1),
            Position::new(0, 0),
            Some(Position::new(2, 0)),
            |_| false,
        );

        assert_eq!(field.distance(Position::new(2, 0)), Some(2));
        assert_eq!(field.distance(Position::new(3, 0)), None);
        assert_eq!(field.distance(Position::new(5, 0)), None);
    }

    #[test]
    fn blocked_origin_leaves_field_empty() {
        let mut field = DistanceField::default();

        field.rebuild_with(Grid::new(3, 3), Position::new(1, 1), None, |_| true);

        assert_eq!(field.distance(Position::new(1, 1)), None);
        assert_eq!(field.descend(Position::new(0, 0)), None);
    }

    #[test]
    fn descend_keeps_first_of_equally_close_neighbors() {
        let mut field = DistanceField::default();

        field.rebuild_with(Grid::new(3, 3), Position::new(2, 2), None, |_| false);

        // From (1,1) both +x and +y lead to distance 1; +x is scanned first.
        assert_eq!(field.descend(Position::new(1, 1)), Some(Direction::Right));
    }

    #[test]
    fn descend_holds_on_origin() {
        let mut field = DistanceField::default();

        field.rebuild_with(Grid::new(3, 3), Position::new(1, 1), None, |_| false);

        assert_eq!(field.descend(Position::new(1, 1)), None);
    }

    #[test]
    fn descend_holds_when_unreachable() {
        let mut field = DistanceField::default();
        let enclosure = [
            Position::new(3, 0),
            Position::new(3, 2),
            Position::new(2, 1),
            Position::new(4, 1),
        ];

        field.rebuild_with(Grid::new(5, 3), Position::new(0, 0), None, |cell| {
            enclosure.contains(&cell)
        });

        assert_eq!(field.distance(Position::new(3, 1)), None);
        assert_eq!(field.descend(Position::new(3, 1)), None);
    }

    proptest! {
        #[test]
        fn prop_open_grid_distances_are_manhattan(
            width in 1u32..16,
            height in 1u32..16,
            origin_seed in 0u32..256,
            probe_seed in 0u32..256,
        ) {
            let grid = Grid::new(width, height);
            let origin = Position::new(origin_seed % width, (origin_seed / 16) % height);
            let probe = Position::new(probe_seed % width, (probe_seed / 16) % height);
            let mut field = DistanceField::default();

            field.rebuild_with(grid, origin, None, |_| false);

            let expected = u16::try_from(origin.manhattan_distance(probe)).unwrap();
            prop_assert_eq!(field.distance(probe), Some(expected));
        }

        #[test]
        fn prop_descend_decreases_distance_by_one(
            width in 1u32..16,
            height in 1u32..16,
            origin_seed in 0u32..256,
            probe_seed in 0u32..256,
        ) {
            let grid = Grid::new(width, height);
            let origin = Position::new(origin_seed % width, (origin_seed / 16) % height);
            let probe = Position::new(probe_seed % width, (probe_seed / 16) % height);
            let mut field = DistanceField::default();

            field.rebuild_with(grid, origin, Some(probe), |_| false);

            let before = field.distance(probe).unwrap();
            match field.descend(probe) {
                Some(direction) => {
                    let next = grid.neighbor(probe, direction).unwrap();
                    prop_assert_eq!(field.distance(next), Some(before - 1));
                }
                None => prop_assert_eq!(probe, origin),
            }
        }
    }
}
