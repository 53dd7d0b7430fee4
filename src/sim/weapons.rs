//! Weapon resolution dispatched by `selectedWeapon` (`spec.md` §4.4.c).

use rand::Rng;

use crate::config::Config;
use crate::entity::bullet::{Bullet, Owner};
use crate::entity::item::WeaponKind;
use crate::entity::{muzzle_point, next_bullet_id};
use crate::error::SimError;
use crate::geometry::{chunk_of, clip_segment_to_rect, facing_vector, Vector2};
use crate::ids::PlayerId;
use crate::sim::combat;
use crate::state::SessionState;

/// Fires the connected, living player's currently selected weapon, subject
/// to the ammo and cooldown pre-check. Movement (P1) and rotation must
/// already have been applied this tick before this runs.
pub fn resolve_shoot(
    state: &mut SessionState,
    config: &Config,
    rng: &mut impl Rng,
    player_id: &PlayerId,
    now: f64,
) -> Result<(), SimError> {
    let (position, rotation, weapon) = {
        let player = state
            .players
            .get(player_id)
            .ok_or_else(|| SimError::InputIgnored(player_id.0.clone()))?;
        if !player.is_alive {
            return Err(SimError::ShootSuppressed);
        }
        (player.position, player.rotation, player.selected_weapon)
    };

    let weapon_cfg = *config.weapon_config(weapon);
    {
        let player = state.players.get(player_id).unwrap();
        if player.ammo_available(weapon) == 0 || now - player.last_shot_at < weapon_cfg.shoot_delay {
            return Err(SimError::ShootSuppressed);
        }
    }
    {
        let player = state.players.get_mut(player_id).unwrap();
        player.last_shot_at = now;
        player.consume_ammo(weapon);
    }

    let muzzle = muzzle_point(position, rotation, config);
    let owner = Owner::Player(player_id.clone());

    if weapon.is_projectile() {
        let velocity = facing_vector(rotation).scale(weapon_cfg.bullet_speed);
        let bullet = Bullet {
            id: next_bullet_id(&mut state.id_alloc),
            position: muzzle,
            velocity,
            owner,
            is_enemy: false,
            weapon_kind: weapon,
            spawn_time: now,
            is_active: true,
            deleted_at: None,
            damage: weapon_cfg.damage,
        };
        state.bullets.insert(bullet.id, bullet);
        return Ok(());
    }

    let neighborhood = chunk_of(muzzle.x, muzzle.y, config.chunk_size).neighborhood();
    let wall_rects: Vec<_> = state.walls_in(neighborhood).iter().map(|w| w.rect()).collect();

    if weapon.is_spread() {
        let pellet_damage = weapon_cfg.damage / config.shotgun_num_pellets as f64;
        let n = config.shotgun_num_pellets;
        for i in 0..n {
            let t = if n > 1 {
                i as f64 / (n - 1) as f64 - 0.5
            } else {
                0.0
            };
            let pellet_rotation = rotation + t * config.shotgun_spread_angle;
            let far_end = muzzle.add(facing_vector(pellet_rotation).scale(config.shotgun_range));
            let endpoint = clip_against_walls(muzzle, far_end, &wall_rects);

            let bullet = Bullet {
                id: next_bullet_id(&mut state.id_alloc),
                position: endpoint,
                velocity: endpoint.sub(muzzle),
                owner: owner.clone(),
                is_enemy: false,
                weapon_kind: weapon,
                spawn_time: now,
                is_active: false,
                deleted_at: Some(now),
                damage: pellet_damage,
            };
            state.bullets.insert(bullet.id, bullet);
            combat::apply_damage_along_segment(state, config, rng, &owner, muzzle, endpoint, pellet_damage, now);
        }
        return Ok(());
    }

    // Railgun: one long hitscan segment.
    let far_end = muzzle.add(facing_vector(rotation).scale(config.sight_radius));
    let endpoint = clip_against_walls(muzzle, far_end, &wall_rects);
    let bullet = Bullet {
        id: next_bullet_id(&mut state.id_alloc),
        position: endpoint,
        velocity: endpoint.sub(muzzle),
        owner: owner.clone(),
        is_enemy: false,
        weapon_kind: weapon,
        spawn_time: now,
        is_active: false,
        deleted_at: Some(now),
        damage: weapon_cfg.damage,
    };
    state.bullets.insert(bullet.id, bullet);
    combat::apply_damage_along_segment(state, config, rng, &owner, muzzle, endpoint, weapon_cfg.damage, now);
    Ok(())
}

fn clip_against_walls(start: Vector2, end: Vector2, walls: &[crate::geometry::Rect]) -> Vector2 {
    let mut endpoint = end;
    for rect in walls {
        let (cx, cy) = clip_segment_to_rect(start.x, start.y, endpoint.x, endpoint.y, *rect);
        endpoint = Vector2::new(cx, cy);
    }
    endpoint
}

/// The weapon kind an enemy's own bullet is tagged with — only used to pick
/// up the shared lifetime/splash classification from `weapon_configs`; the
/// bullet's actual speed/damage still come from the enemy's own config.
pub fn enemy_weapon_for(kind: crate::entity::enemy::EnemyKind) -> WeaponKind {
    if kind.fires_rockets() {
        WeaponKind::RocketLauncher
    } else {
        WeaponKind::Blaster
    }
}
