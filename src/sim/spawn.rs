//! Spawn point selection (`spec.md` §4.4 P1.a).

use rand::Rng;

use crate::config::Config;
use crate::geometry::{chunk_of, Rect, Vector2};
use crate::state::SessionState;

/// Picks a uniformly random chunk neighboring `reference`'s chunk, starts at
/// its center, then shifts diagonally by the player's size until clear of
/// every wall, live enemy, and live connected player in the session.
pub fn pick_spawn_point(state: &SessionState, config: &Config, rng: &mut impl Rng, reference: Vector2) -> Vector2 {
    let home = chunk_of(reference.x, reference.y, config.chunk_size);
    let candidates: Vec<_> = home.neighborhood().into_iter().filter(|c| *c != home).collect();
    let chosen = candidates[rng.gen_range(0..candidates.len())];
    let mut position = chosen.center(config.chunk_size);

    let player_size = config.player_radius * 2.0;

    let mut collidables: Vec<Rect> = Vec::new();
    for wall in state.all_walls() {
        collidables.push(wall.rect());
    }
    for enemy in state.all_enemies() {
        if !enemy.is_alive {
            continue;
        }
        let size = config.enemy_config(enemy.kind).size;
        collidables.push(Rect::from_center_size(enemy.position, size, size));
    }
    for player in state.players.values() {
        if !player.is_alive || !player.is_connected {
            continue;
        }
        collidables.push(Rect::from_center_size(player.position, player_size, player_size));
    }

    loop {
        let spawn_rect = Rect::from_center_size(position, player_size, player_size);
        let blocked = collidables
            .iter()
            .any(|obj| crate::geometry::rect_intersects_rect(spawn_rect, *obj));
        if !blocked {
            return position;
        }
        position = position.add(Vector2::new(player_size, player_size));
    }
}
