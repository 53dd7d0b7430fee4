//! Damage application shared by weapon resolution (`spec.md` §4.4.c) and
//! bullet impact (§4.4 P3): hitscan segments and splash both funnel through
//! here so the kill/credit/bonus-drop rules live in exactly one place.

use std::collections::HashSet;

use rand::Rng;

use crate::config::Config;
use crate::entity::bonus::{Bonus, BonusKind};
use crate::entity::bullet::Owner;
use crate::entity::enemy::EnemyKind;
use crate::geometry::{closest_point_on_segment, Vector2};
use crate::ids::{BonusId, EnemyId, PlayerId};
use crate::state::SessionState;

/// Entities a hit or splash pass actually touched, used to keep splash from
/// double-hitting whatever the direct hit already resolved.
#[derive(Debug, Default)]
pub struct HitSet {
    pub players: HashSet<PlayerId>,
    pub enemies: HashSet<EnemyId>,
}

fn credit_player_kill(state: &mut SessionState, owner: &Owner, reward_money: i64, reward_score: i64) {
    if let Owner::Player(shooter_id) = owner {
        if let Some(shooter) = state.players.get_mut(shooter_id) {
            shooter.money += reward_money;
            shooter.score += reward_score;
            shooter.kills += 1;
        }
    }
}

fn drop_chest(state: &mut SessionState, position: Vector2, inventory: crate::entity::item::Inventory, dropped_by: Option<PlayerId>, now: f64) {
    let id = BonusId(state.id_alloc.next());
    let bonus = Bonus {
        id,
        position,
        kind: BonusKind::Chest,
        dropped_by: dropped_by.clone(),
        dropped_at: dropped_by.map(|_| now),
        picked_up_by: None,
        picked_up_at: None,
        inventory: Some(inventory),
    };
    state.bonuses.insert(id, bonus);
}

/// `spec.md` §4.4.d: roll a Soldier/Lieutenant's single bonus drop, or
/// assemble a Tower's chest from independent per-item draws.
fn roll_enemy_bonus_drop(state: &mut SessionState, config: &Config, rng: &mut impl Rng, kind: EnemyKind, position: Vector2) {
    if kind == EnemyKind::Tower {
        let mut inventory = crate::entity::item::Inventory::default();
        for (item, entry) in &config.tower_chest_drop_table {
            if rng.gen_bool(entry.chance) {
                let qty = if entry.qty_max > entry.qty_min {
                    rng.gen_range(entry.qty_min..=entry.qty_max)
                } else {
                    entry.qty_min
                };
                inventory.add(*item, qty);
            }
        }
        drop_chest(state, position, inventory, None, 0.0);
        return;
    }

    let drop_chance = config.enemy_config(kind).bonus_drop_chance;
    if !rng.gen_bool(drop_chance) {
        return;
    }
    let bonus_kind = if rng.gen_bool(config.enemy_goggles_drop_chance) {
        BonusKind::Goggles
    } else {
        BonusKind::AidKit
    };
    let id = BonusId(state.id_alloc.next());
    let bonus = Bonus {
        id,
        position,
        kind: bonus_kind,
        dropped_by: None,
        dropped_at: None,
        picked_up_by: None,
        picked_up_at: None,
        inventory: None,
    };
    state.bonuses.insert(id, bonus);
}

/// Applies `damage` to every live, non-owner player and every live enemy
/// (other than the one that owns the bullet) whose closest distance to the
/// swept segment `seg_start -> seg_end` is below their hit threshold.
/// Returns the set of entities that were within range, hit or not (used to
/// exclude them from a subsequent splash pass).
pub fn apply_damage_along_segment(
    state: &mut SessionState,
    config: &Config,
    rng: &mut impl Rng,
    owner: &Owner,
    seg_start: Vector2,
    seg_end: Vector2,
    damage: f64,
    now: f64,
) -> HitSet {
    let mut hits = HitSet::default();

    let player_ids: Vec<PlayerId> = state.players.keys().cloned().collect();
    for pid in player_ids {
        if matches!(owner, Owner::Player(id) if id == &pid) {
            continue;
        }
        let (is_hit, lethal, position) = {
            let player = state.players.get_mut(&pid).unwrap();
            if !player.is_alive || !player.is_connected || player.invulnerable_timer > 0.0 {
                continue;
            }
            let closest = closest_point_on_segment(player.position, seg_start, seg_end);
            let dist = closest.distance_to(player.position);
            if dist >= config.player_radius + config.bullet_radius {
                continue;
            }
            player.lives -= damage;
            let lethal = player.lives <= 0.0;
            if !lethal {
                player.invulnerable_timer = config.player_invulnerability_time;
            }
            (true, lethal, player.position)
        };
        if !is_hit {
            continue;
        }
        hits.players.insert(pid.clone());
        if lethal {
            let inventory = {
                let player = state.players.get_mut(&pid).unwrap();
                player.is_alive = false;
                player.lives = 0.0;
                std::mem::take(&mut player.inventory)
            };
            drop_chest(state, position, inventory, Some(pid.clone()), now);
            credit_player_kill(state, owner, config.player_reward, config.player_reward);
        }
    }

    let enemy_keys: Vec<(crate::geometry::ChunkKey, EnemyId)> = state
        .enemies_by_chunk
        .iter()
        .flat_map(|(chunk, m)| m.keys().map(move |id| (*chunk, *id)))
        .collect();
    for (chunk, eid) in enemy_keys {
        if matches!(owner, Owner::Enemy(id) if *id == eid) {
            continue;
        }
        let map = state.enemies_by_chunk.get_mut(&chunk).unwrap();
        let enemy = map.get_mut(&eid).unwrap();
        if !enemy.is_alive {
            continue;
        }
        let radius = enemy.bounding_radius(config);
        let closest = closest_point_on_segment(enemy.position, seg_start, seg_end);
        let dist = closest.distance_to(enemy.position);
        if dist >= radius + config.bullet_radius {
            continue;
        }
        enemy.lives -= damage;
        hits.enemies.insert(eid);
        if enemy.lives <= 0.0 {
            enemy.is_alive = false;
            enemy.dead_timer = config.enemy_config(enemy.kind).dead_timer;
            let kind = enemy.kind;
            let position = enemy.position;
            let (reward_money, reward_score) = {
                let cfg = config.enemy_config(kind);
                (cfg.reward_money, cfg.reward_score)
            };
            credit_player_kill(state, owner, reward_money, reward_score);
            roll_enemy_bonus_drop(state, config, rng, kind, position);
        }
    }

    hits
}

/// Rocket splash (`spec.md` §4.4 P3): every live player/enemy not already in
/// `exclude`, within `radius` of `center`, takes damage scaled linearly by
/// distance.
pub fn apply_splash_damage(
    state: &mut SessionState,
    config: &Config,
    rng: &mut impl Rng,
    owner: &Owner,
    center: Vector2,
    radius: f64,
    max_damage: f64,
    exclude: &HitSet,
    now: f64,
) {
    let player_ids: Vec<PlayerId> = state
        .players
        .keys()
        .filter(|id| !exclude.players.contains(*id))
        .cloned()
        .collect();
    for pid in player_ids {
        if matches!(owner, Owner::Player(id) if id == &pid) {
            continue;
        }
        let (lethal, position) = {
            let player = state.players.get_mut(&pid).unwrap();
            if !player.is_alive || !player.is_connected || player.invulnerable_timer > 0.0 {
                continue;
            }
            let dist = player.position.distance_to(center);
            if dist >= radius {
                continue;
            }
            let damage = max_damage * (1.0 - dist / radius);
            player.lives -= damage;
            let lethal = player.lives <= 0.0;
            if !lethal {
                player.invulnerable_timer = config.player_invulnerability_time;
            }
            (lethal, player.position)
        };
        if lethal {
            let inventory = {
                let player = state.players.get_mut(&pid).unwrap();
                player.is_alive = false;
                player.lives = 0.0;
                std::mem::take(&mut player.inventory)
            };
            drop_chest(state, position, inventory, Some(pid.clone()), now);
            credit_player_kill(state, owner, config.player_reward, config.player_reward);
        }
    }

    let enemy_keys: Vec<(crate::geometry::ChunkKey, EnemyId)> = state
        .enemies_by_chunk
        .iter()
        .flat_map(|(chunk, m)| m.keys().map(move |id| (*chunk, *id)))
        .filter(|(_, id)| !exclude.enemies.contains(id))
        .collect();
    for (chunk, eid) in enemy_keys {
        if matches!(owner, Owner::Enemy(id) if *id == eid) {
            continue;
        }
        let map = state.enemies_by_chunk.get_mut(&chunk).unwrap();
        let enemy = map.get_mut(&eid).unwrap();
        if !enemy.is_alive {
            continue;
        }
        let dist = enemy.position.distance_to(center);
        if dist >= radius {
            continue;
        }
        let damage = max_damage * (1.0 - dist / radius);
        enemy.lives -= damage;
        if enemy.lives <= 0.0 {
            enemy.is_alive = false;
            enemy.dead_timer = config.enemy_config(enemy.kind).dead_timer;
            let kind = enemy.kind;
            let position = enemy.position;
            let (reward_money, reward_score) = {
                let cfg = config.enemy_config(kind);
                (cfg.reward_money, cfg.reward_score)
            };
            credit_player_kill(state, owner, reward_money, reward_score);
            roll_enemy_bonus_drop(state, config, rng, kind, position);
        }
    }
}
