//! Deterministic-by-chunk procedural generation of walls, one tower enemy,
//! patrolling enemies, and a shop per chunk (`spec.md` §4.3).
//!
//! Generation is idempotent: it is only ever invoked through
//! `ensure_chunk_generated`, which is guarded by `SessionState`'s
//! `generated_chunks` set, mirroring how the teacher seeds one
//! `TerrainGenerator` per world from a single `settings.seed` and derives
//! per-chunk noise offsets from chunk coordinates rather than re-rolling a
//! process-global RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::entity::enemy::{Enemy, EnemyKind};
use crate::entity::shop::{Shop, ShopListing};
use crate::entity::wall::{Orientation, Wall};
use crate::geometry::{rect_intersects_rect, ChunkKey, Rect, Vector2};
use crate::state::SessionState;

fn chunk_rng(session_seed: u64, chunk: ChunkKey) -> StdRng {
    // Mix the session seed with the chunk coordinates so every chunk gets
    // an independent, reproducible stream without a shared mutable RNG.
    let mixed = session_seed
        ^ (chunk.cx as u64).wrapping_mul(0x9E3779B97F4A7C15)
        ^ (chunk.cy as u64).wrapping_mul(0xC2B2AE3D27D4EB4F);
    StdRng::seed_from_u64(mixed)
}

/// Generates `chunk` if it hasn't been generated yet. `requesting_position`
/// is the position of the player whose 3x3 neighborhood reference triggered
/// generation, used to keep walls from popping in directly on top of them.
pub fn ensure_chunk_generated(
    state: &mut SessionState,
    chunk: ChunkKey,
    config: &Config,
    requesting_position: Vector2,
) {
    if state.generated_chunks.contains(&chunk) {
        return;
    }
    state.generated_chunks.insert(chunk);

    let mut rng = chunk_rng(state.world_seed, chunk);
    let bounds = Rect::from_center_size(chunk.center(config.chunk_size), config.chunk_size, config.chunk_size);

    place_shop(state, chunk, config, &mut rng, bounds);
    let tower_rect = place_tower(state, chunk, config, &mut rng, bounds);
    place_walls(state, chunk, config, &mut rng, bounds, tower_rect, requesting_position);
}

fn place_shop(state: &mut SessionState, chunk: ChunkKey, config: &Config, rng: &mut StdRng, bounds: Rect) {
    let mut inventory = std::collections::HashMap::new();
    for (kind, item_config) in &config.shop_item_configs {
        if rng.gen_bool(item_config.spawn_chance) {
            let quantity = if item_config.qty_max > item_config.qty_min {
                rng.gen_range(item_config.qty_min..=item_config.qty_max)
            } else {
                item_config.qty_min
            };
            inventory.insert(
                *kind,
                ShopListing {
                    price: item_config.price,
                    quantity,
                    pack_size: item_config.pack_size,
                },
            );
        }
    }

    let shop = Shop {
        id: crate::ids::ShopId(state.id_alloc.next()),
        position: bounds.center,
        name: format!("Outpost {}", chunk.to_key_string()),
        inventory,
    };
    state
        .shops_by_chunk
        .entry(chunk)
        .or_default()
        .insert(shop.id, shop);
}

fn place_tower(
    state: &mut SessionState,
    chunk: ChunkKey,
    config: &Config,
    rng: &mut StdRng,
    bounds: Rect,
) -> Rect {
    let tower_config = config.enemy_config(EnemyKind::Tower);
    let radius = tower_config.size / 2.0;
    let min = bounds.min();
    let max = bounds.max();
    let position = Vector2::new(
        rng.gen_range((min.x + radius)..(max.x - radius)),
        rng.gen_range((min.y + radius)..(max.y - radius)),
    );

    let tower = Enemy {
        id: crate::ids::EnemyId(state.id_alloc.next()),
        position,
        rotation: 0.0,
        kind: EnemyKind::Tower,
        wall_id: None,
        direction: 1,
        lives: tower_config.lives,
        shoot_delay: 0.0,
        is_alive: true,
        dead_timer: 0.0,
    };
    let exclusion = Rect::from_center_size(position, tower_config.size, tower_config.size)
        .expanded(config.enemy_config(EnemyKind::Soldier).size);
    state
        .enemies_by_chunk
        .entry(chunk)
        .or_default()
        .insert(tower.id, tower);
    exclusion
}

#[allow(clippy::too_many_arguments)]
fn place_walls(
    state: &mut SessionState,
    chunk: ChunkKey,
    config: &Config,
    rng: &mut StdRng,
    bounds: Rect,
    tower_exclusion: Rect,
    requesting_position: Vector2,
) {
    let area_factor = (config.chunk_size / 1000.0).powi(2);
    let num_walls = rng
        .gen_range(config.min_walls_per_kpx2..=config.max_walls_per_kpx2)
        * area_factor;
    let num_walls = num_walls.round().max(0.0) as u32;

    let mut placed: Vec<Wall> = Vec::new();
    let max_attempts = (num_walls as usize).saturating_mul(20).max(20);
    let keep_clear = config.torch_radius + 40.0;

    for _ in 0..max_attempts {
        if placed.len() as u32 >= num_walls {
            break;
        }

        let orientation = if rng.gen_bool(0.5) {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        };
        let long_len = rng.gen_range(config.wall_long_min..=config.wall_long_max);
        let (width, height) = match orientation {
            Orientation::Vertical => (config.wall_width, long_len),
            Orientation::Horizontal => (long_len, config.wall_width),
        };

        let min = bounds.min();
        let max = bounds.max();
        let margin = config.wall_safety_margin + long_len / 2.0;
        if max.x - margin <= min.x + margin || max.y - margin <= min.y + margin {
            continue;
        }
        let center = Vector2::new(
            rng.gen_range((min.x + margin)..(max.x - margin)),
            rng.gen_range((min.y + margin)..(max.y - margin)),
        );

        let candidate_rect = Rect::from_center_size(center, width, height);

        if placed.iter().any(|w| rect_intersects_rect(candidate_rect, w.rect())) {
            continue;
        }
        if rect_intersects_rect(candidate_rect, tower_exclusion) {
            continue;
        }
        if (center.x - requesting_position.x).abs() < keep_clear
            && (center.y - requesting_position.y).abs() < keep_clear
        {
            continue;
        }

        let wall = Wall::new(
            crate::ids::WallId(state.id_alloc.next()),
            center,
            width,
            height,
            orientation,
        );

        if rng.gen_bool(config.enemy_spawn_chance_per_wall) {
            spawn_wall_enemy(state, chunk, config, rng, &wall);
        }

        placed.push(wall);
    }

    let wall_map = state.walls_by_chunk.entry(chunk).or_default();
    for wall in placed {
        wall_map.insert(wall.id, wall);
    }
}

fn spawn_wall_enemy(state: &mut SessionState, chunk: ChunkKey, config: &Config, rng: &mut StdRng, wall: &Wall) {
    let kind = if rng.gen_bool(config.enemy_lieutenant_chance) {
        EnemyKind::Lieutenant
    } else {
        EnemyKind::Soldier
    };
    let enemy_config = config.enemy_config(kind);
    let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let offset_distance = wall.short_half_extent() + enemy_config.size / 2.0;

    let position = match wall.orientation {
        Orientation::Vertical => Vector2::new(wall.position.x + side * offset_distance, wall.position.y),
        Orientation::Horizontal => Vector2::new(wall.position.x, wall.position.y + side * offset_distance),
    };

    let enemy = Enemy {
        id: crate::ids::EnemyId(state.id_alloc.next()),
        position,
        rotation: 0.0,
        kind,
        wall_id: Some(wall.id),
        direction: 1,
        lives: enemy_config.lives,
        shoot_delay: 0.0,
        is_alive: true,
        dead_timer: 0.0,
    };

    state
        .enemies_by_chunk
        .entry(chunk)
        .or_default()
        .insert(enemy.id, enemy);
}
