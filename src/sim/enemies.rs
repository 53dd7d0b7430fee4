//! Enemy AI: perception, rotation, firing, and patrol (`spec.md` §4.4 P2).

use rand::Rng;

use crate::config::Config;
use crate::detection::{self, DetectionParams};
use crate::entity::bullet::{Bullet, Owner};
use crate::entity::enemy::EnemyKind;
use crate::entity::next_bullet_id;
use crate::entity::wall::Orientation;
use crate::geometry::{chunk_of, circle_intersects_circle, circle_intersects_rect, facing_vector, normalize_degrees, segment_intersects_rect, ChunkKey, Vector2};
use crate::ids::{EnemyId, PlayerId};
use crate::state::SessionState;

fn angle_to(from: Vector2, to: Vector2) -> f64 {
    let d = to.sub(from);
    normalize_degrees((-d.x).atan2(d.y).to_degrees())
}

fn shortest_signed_diff(current: f64, desired: f64) -> f64 {
    let raw = normalize_degrees(desired - current);
    if raw > 180.0 {
        raw - 360.0
    } else {
        raw
    }
}

pub fn run(state: &mut SessionState, config: &Config, rng: &mut impl Rng, dt: f64, now: f64) {
    let chunks: Vec<ChunkKey> = state
        .active_chunk_neighborhood(config.chunk_size)
        .into_iter()
        .collect();

    let player_detections: Vec<(PlayerId, Vector2, DetectionParams)> = state
        .players
        .values()
        .filter(|p| p.is_alive && p.is_connected)
        .map(|p| (p.id.clone(), p.position, detection::detection_params(p, config)))
        .collect();
    let player_positions: Vec<Vector2> = player_detections.iter().map(|(_, pos, _)| *pos).collect();
    let enemy_snapshot: Vec<(EnemyId, Vector2, f64, bool)> = state
        .all_enemies()
        .map(|e| (e.id, e.position, e.bounding_radius(config), e.is_alive))
        .collect();

    let mut to_remove: Vec<(ChunkKey, EnemyId)> = Vec::new();

    for chunk in &chunks {
        let Some(map) = state.enemies_by_chunk.get_mut(chunk) else {
            continue;
        };
        for enemy in map.values_mut() {
            if !enemy.is_alive {
                enemy.dead_timer -= dt;
                if enemy.dead_timer <= 0.0 {
                    to_remove.push((*chunk, enemy.id));
                }
                continue;
            }

            enemy.shoot_delay -= dt;
            let enemy_size = config.enemy_config(enemy.kind).size;

            let mut has_players_in_sight = false;
            let mut can_see = false;
            let mut best_dist = f64::INFINITY;
            let mut best_target: Option<Vector2> = None;

            for (_, ppos, pdet) in &player_detections {
                let dist_to_point = enemy.position.distance_to(pdet.point);
                if dist_to_point < config.sight_radius {
                    has_players_in_sight = true;
                }
                if dist_to_point > pdet.radius + enemy_size / 2.0 {
                    continue;
                }
                let broadphase_radius = pdet.radius;
                let nbhd = chunk_of(enemy.position.x, enemy.position.y, config.chunk_size).neighborhood();
                let mut occluded = false;
                'walls: for c in nbhd.iter() {
                    if let Some(wmap) = state.walls_by_chunk.get(c) {
                        for w in wmap.values() {
                            if w.center().distance_to(enemy.position) > 2.0 * w.bounding_radius() + broadphase_radius {
                                continue;
                            }
                            if segment_intersects_rect(enemy.position, pdet.point, w.rect()) {
                                occluded = true;
                                break 'walls;
                            }
                        }
                    }
                }
                if !occluded && dist_to_point < best_dist {
                    best_dist = dist_to_point;
                    best_target = Some(*ppos);
                    can_see = true;
                }
            }

            if !has_players_in_sight {
                continue;
            }

            if can_see {
                if let Some(target) = best_target {
                    let desired = angle_to(enemy.position, target);
                    if enemy.kind == EnemyKind::Tower {
                        let diff = shortest_signed_diff(enemy.rotation, desired);
                        let step = config.enemy_tower_rotation_speed * dt;
                        if diff.abs() <= step {
                            enemy.rotation = desired;
                        } else {
                            enemy.rotation = normalize_degrees(enemy.rotation + step * diff.signum());
                        }
                    } else {
                        enemy.rotation = desired;
                    }

                    if enemy.shoot_delay <= 0.0 && (enemy.rotation - desired).abs() < 1e-9 {
                        let enemy_cfg = config.enemy_config(enemy.kind);
                        let weapon_kind = crate::sim::weapons::enemy_weapon_for(enemy.kind);
                        let velocity = facing_vector(enemy.rotation).scale(enemy_cfg.bullet_speed);
                        let bullet = Bullet {
                            id: next_bullet_id(&mut state.id_alloc),
                            position: enemy.position,
                            velocity,
                            owner: Owner::Enemy(enemy.id),
                            is_enemy: true,
                            weapon_kind,
                            spawn_time: now,
                            is_active: true,
                            deleted_at: None,
                            damage: enemy_cfg.bullet_damage,
                        };
                        state.bullets.insert(bullet.id, bullet);
                        enemy.shoot_delay = enemy_cfg.shoot_delay;
                    }
                }
            }

            // Soldiers patrol only while they can't see a player; Lieutenants
            // always patrol; Towers never do (`spec.md` §4.4 P2 patrol rule).
            let should_patrol = match enemy.kind {
                EnemyKind::Soldier => !can_see,
                EnemyKind::Lieutenant => true,
                EnemyKind::Tower => false,
            };
            if !should_patrol {
                continue;
            }
            let Some(wall_id) = enemy.wall_id else { continue };
            let wall = state
                .walls_by_chunk
                .get(chunk)
                .and_then(|m| m.get(&wall_id))
                .or_else(|| state.walls_by_chunk.values().flat_map(|m| m.values()).find(|w| w.id == wall_id));
            let Some(wall) = wall else {
                tracing::error!(enemy = ?enemy.id, wall = ?wall_id, chunk = ?chunk, "enemy references a wall that no longer resolves anywhere in the session, dropping enemy");
                to_remove.push((*chunk, enemy.id));
                continue;
            };

            let patrol_speed = config.enemy_config(enemy.kind).patrol_speed;
            let axis = match wall.orientation {
                Orientation::Vertical => Vector2::new(0.0, 1.0),
                Orientation::Horizontal => Vector2::new(1.0, 0.0),
            };
            let candidate = enemy
                .position
                .add(axis.scale(patrol_speed * dt * enemy.direction as f64));
            let radius = enemy_size / 2.0;

            let mut blocked = false;
            let nbhd = chunk_of(enemy.position.x, enemy.position.y, config.chunk_size).neighborhood();
            'wall_collision: for c in nbhd.iter() {
                if let Some(wmap) = state.walls_by_chunk.get(c) {
                    for w in wmap.values() {
                        if w.id == wall_id {
                            continue;
                        }
                        if circle_intersects_rect(candidate, radius, w.rect()) {
                            blocked = true;
                            break 'wall_collision;
                        }
                    }
                }
            }
            if !blocked {
                for (other_id, other_pos, other_radius, other_alive) in &enemy_snapshot {
                    if *other_id == enemy.id || !*other_alive {
                        continue;
                    }
                    if circle_intersects_circle(candidate, radius, *other_pos, *other_radius) {
                        blocked = true;
                        break;
                    }
                }
            }
            if !blocked {
                for p in &player_positions {
                    if circle_intersects_circle(candidate, radius, *p, config.player_radius) {
                        blocked = true;
                        break;
                    }
                }
            }

            if blocked {
                enemy.direction = -enemy.direction;
                continue;
            }
            enemy.position = candidate;

            let half = wall.long_half_extent();
            let (center_val, pos_val) = match wall.orientation {
                Orientation::Vertical => (wall.position.y, enemy.position.y),
                Orientation::Horizontal => (wall.position.x, enemy.position.x),
            };
            if pos_val > center_val + half || pos_val < center_val - half {
                enemy.direction = -enemy.direction;
                let clamped = pos_val.clamp(center_val - half, center_val + half);
                match wall.orientation {
                    Orientation::Vertical => enemy.position.y = clamped,
                    Orientation::Horizontal => enemy.position.x = clamped,
                }
            }
        }
    }

    for (chunk, id) in to_remove {
        if let Some(map) = state.enemies_by_chunk.get_mut(&chunk) {
            map.remove(&id);
        }
    }
}
