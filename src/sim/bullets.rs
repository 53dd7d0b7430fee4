//! Bullet movement, wall clipping, and impact resolution (`spec.md` §4.4 P3).

use rand::Rng;

use crate::config::Config;
use crate::geometry::{chunk_of, clip_segment_to_rect, Vector2};
use crate::ids::BulletId;
use crate::sim::combat;
use crate::state::SessionState;

pub fn run(state: &mut SessionState, config: &Config, rng: &mut impl Rng, dt: f64, now: f64) {
    let bullet_ids: Vec<BulletId> = state.bullets.keys().copied().collect();
    let mut to_remove: Vec<BulletId> = Vec::new();

    for id in bullet_ids {
        let Some(bullet) = state.bullets.get(&id) else { continue };

        if let Some(deleted_at) = bullet.deleted_at {
            if now - deleted_at > config.dead_entities_cache_timeout {
                to_remove.push(id);
            }
            continue;
        }

        let lifetime = config.weapon_config(bullet.weapon_kind).lifetime;
        if let Some(lifetime) = lifetime {
            if now - bullet.spawn_time > lifetime {
                let bullet = state.bullets.get_mut(&id).unwrap();
                bullet.mark_deleted(now);
                continue;
            }
        }

        let start = bullet.position;
        let intended = bullet.velocity.scale(dt);
        let end = start.add(intended);

        let chunk = chunk_of(end.x, end.y, config.chunk_size);
        let neighborhood = chunk.neighborhood();
        let wall_rects: Vec<_> = state.walls_in(neighborhood).iter().map(|w| w.rect()).collect();

        let mut endpoint = end;
        for rect in &wall_rects {
            let (cx, cy) = clip_segment_to_rect(start.x, start.y, endpoint.x, endpoint.y, *rect);
            endpoint = Vector2::new(cx, cy);
        }
        let hit_found = endpoint != end;

        let owner = state.bullets.get(&id).unwrap().owner.clone();
        let damage = state.bullets.get(&id).unwrap().damage;
        let weapon_kind = state.bullets.get(&id).unwrap().weapon_kind;

        let hits = combat::apply_damage_along_segment(state, config, rng, &owner, start, endpoint, damage, now);

        if hit_found && weapon_kind.has_splash() {
            combat::apply_splash_damage(
                state,
                config,
                rng,
                &owner,
                endpoint,
                config.rocket_launcher_damage_radius,
                config.rocket_launcher_damage,
                &hits,
                now,
            );
        }

        let bullet = state.bullets.get_mut(&id).unwrap();
        bullet.position = endpoint;
        if hit_found {
            bullet.mark_deleted(now);
        }
    }

    for id in to_remove {
        state.bullets.remove(&id);
    }
}
