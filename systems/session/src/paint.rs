//! Translates world events into LED matrix writes.

use gem_maze_core::{Color, EnemyId, Event, Position};
use gem_maze_rendering::{palette, LedMatrix, RenderingError};
use gem_maze_world::{query, World};

/// Redraws every cell from the current world state.
pub(crate) fn repaint<M: LedMatrix>(world: &World, matrix: &mut M) -> Result<(), RenderingError> {
    matrix.fill_all(palette::BACKGROUND);

    for wall in query::walls(world) {
        matrix.set_cell(wall.position(), wall.color())?;
    }
    let gem_color = query::gem_color(world);
    for gem in query::gems(world).iter().filter(|gem| !gem.is_collected()) {
        matrix.set_cell(gem.position(), gem_color)?;
    }
    let player = query::player(world);
    matrix.set_cell(player.position, player.color)?;
    for enemy in query::enemy_view(world).iter() {
        matrix.set_cell(enemy.position, enemy.color)?;
    }

    Ok(())
}

/// Paints the cells touched by `events`, which must describe the latest
/// change to `world`.
pub(crate) fn apply_events<M: LedMatrix>(
    world: &World,
    events: &[Event],
    matrix: &mut M,
) -> Result<(), RenderingError> {
    for event in events {
        match *event {
            Event::PlayerMoved { from, to } => {
                restore(world, from, None, matrix)?;
                matrix.set_cell(to, query::player(world).color)?;
            }
            Event::EnemyMoved { enemy, from, to } => {
                restore(world, from, Some(enemy), matrix)?;
                if let Some(color) = enemy_color(world, enemy) {
                    matrix.set_cell(to, color)?;
                }
            }
            Event::EnemyHeld { enemy, at } => {
                if let Some(color) = enemy_color(world, enemy) {
                    matrix.set_cell(at, color)?;
                }
            }
            Event::LevelReset | Event::LevelRestarted => repaint(world, matrix)?,
            Event::PlayerBlocked { .. }
            | Event::GemCollected { .. }
            | Event::LevelWon
            | Event::PlayerHit { .. }
            | Event::LivesExhausted => {}
        }
    }

    Ok(())
}

/// Repaints a vacated cell with whatever still occupies it.
fn restore<M: LedMatrix>(
    world: &World,
    cell: Position,
    mover: Option<EnemyId>,
    matrix: &mut M,
) -> Result<(), RenderingError> {
    matrix.set_cell(cell, underlying_color(world, cell, mover))
}

fn underlying_color(world: &World, cell: Position, mover: Option<EnemyId>) -> Color {
    let enemies = query::enemy_view(world);
    if let Some(enemy) = enemies
        .iter()
        .find(|enemy| enemy.position == cell && Some(enemy.id) != mover)
    {
        return enemy.color;
    }

    let player = query::player(world);
    if player.position == cell {
        return player.color;
    }

    match query::gem_at(world, cell) {
        Some(gem) if !gem.is_collected() => query::gem_color(world),
        _ => palette::BACKGROUND,
    }
}

fn enemy_color(world: &World, enemy: EnemyId) -> Option<Color> {
    query::enemy_view(world).get(enemy).map(|snapshot| snapshot.color)
}
