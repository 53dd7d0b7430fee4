//! Per-player detection model (`spec.md` §4.5). Everything in the delta
//! builder and the enemy AI's perception step is phrased in terms of a
//! viewer's `(point, radius)` detection pair.

use crate::config::Config;
use crate::entity::player::Player;
use crate::geometry::Vector2;

#[derive(Debug, Clone, Copy)]
pub struct DetectionParams {
    pub point: Vector2,
    pub radius: f64,
}

/// Rotates the torch offset around the player by their facing rotation.
pub fn torch_point(player: &Player, config: &Config) -> Vector2 {
    player
        .position
        .add(config.torch_offset)
        .rotate_around(player.position, player.rotation)
}

/// `detectionParams(player)`: the (point, radius) pair describing what the
/// player can perceive this tick.
pub fn detection_params(player: &Player, config: &Config) -> DetectionParams {
    if player.night_vision_timer > 0.0 {
        DetectionParams {
            point: player.position,
            radius: config.night_vision_detection_radius,
        }
    } else {
        DetectionParams {
            point: torch_point(player, config),
            radius: config.torch_radius,
        }
    }
}

/// General visibility rule for non-wall entities (`spec.md` §4.2): within
/// `detectionDistance + entitySize/2` of the viewer's detection point,
/// widened to `SightRadius` measured directly from the viewer's position
/// when night vision is active.
pub fn is_point_visible_to(entity_pos: Vector2, entity_size: f64, viewer: &Player, config: &Config) -> bool {
    if viewer.night_vision_timer > 0.0 {
        viewer.position.distance_to(entity_pos) < config.sight_radius
    } else {
        let params = detection_params(viewer, config);
        params.point.distance_to(entity_pos) < params.radius + entity_size / 2.0
    }
}

/// Walls are visible when any corner lies within `SightRadius` of the
/// viewer's own position (not the detection point).
pub fn is_wall_visible_to(wall: &crate::entity::wall::Wall, viewer: &Player, config: &Config) -> bool {
    wall.corners_within_sight(viewer.position, config.sight_radius)
}
