//! Sliding collision (`spec.md` §4.4 P1.b) and the broadphase rect
//! gathering it shares with spawn-point selection (P1.a).

use crate::config::Config;
use crate::geometry::{clip_segment_to_rect, Rect, Vector2};
use crate::ids::PlayerId;
use crate::state::SessionState;

/// Collects collidable AABBs from walls and live enemies (each expanded by
/// `PlayerRadius` on every side) and from other live, connected players
/// (each expanded to a `4*radius` square), across `chunks`.
pub fn gather_collidables(
    state: &SessionState,
    config: &Config,
    chunks: &[crate::geometry::ChunkKey],
    exclude_player: Option<&PlayerId>,
) -> Vec<Rect> {
    let radius = config.player_radius;
    let mut rects = Vec::new();

    for wall in state.walls_in(chunks.iter().copied()) {
        rects.push(wall.rect().expanded(radius));
    }

    for enemy in state.enemies_in(chunks.iter().copied()) {
        if !enemy.is_alive {
            continue;
        }
        let size = config.enemy_config(enemy.kind).size;
        rects.push(Rect::from_center_size(enemy.position, size, size).expanded(radius));
    }

    for player in state.players.values() {
        if !player.is_alive || !player.is_connected {
            continue;
        }
        if Some(&player.id) == exclude_player {
            continue;
        }
        rects.push(Rect::from_center_size(player.position, radius * 4.0, radius * 4.0));
    }

    rects
}

/// Clips `candidate` (a delta from `position`) against every rect in
/// `collidables`, returning the farthest sub-vector that doesn't enter any
/// of them.
fn clip_candidate(position: Vector2, candidate: Vector2, collidables: &[Rect]) -> Vector2 {
    let mut endpoint = position.add(candidate);
    for rect in collidables {
        let (cx, cy) = clip_segment_to_rect(position.x, position.y, endpoint.x, endpoint.y, *rect);
        endpoint = Vector2::new(cx, cy);
    }
    endpoint.sub(position)
}

/// Resolves sliding collision for a move of `intended_delta` starting at
/// `position`: the diagonal move clipped against every collidable, or (when
/// that clips to zero) whichever axis-only candidate survives — giving the
/// "slide along the wall" behavior.
pub fn resolve_sliding_collision(
    position: Vector2,
    intended_delta: Vector2,
    collidables: &[Rect],
) -> Vector2 {
    if intended_delta.x == 0.0 && intended_delta.y == 0.0 {
        return Vector2::ZERO;
    }

    let diagonal = clip_candidate(position, intended_delta, collidables);
    if diagonal.x != 0.0 || diagonal.y != 0.0 {
        return diagonal;
    }

    let axis_x = clip_candidate(position, Vector2::new(intended_delta.x, 0.0), collidables);
    if axis_x.x != 0.0 {
        return axis_x;
    }

    clip_candidate(position, Vector2::new(0.0, intended_delta.y), collidables)
}

/// `true` if `position` clears every wall AABB by at least `radius` (used by
/// the sliding-collision idempotence test in `spec.md` §8).
pub fn clears_all_walls(position: Vector2, collidables: &[Rect], radius: f64) -> bool {
    collidables
        .iter()
        .all(|r| !crate::geometry::circle_intersects_rect(position, radius, r.expanded(-radius)))
}
