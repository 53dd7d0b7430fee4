//! Per-player tick phase (`spec.md` §4.4 P1): respawn, timers, recharge,
//! item/purchase draining, input application, and lazy chunk generation.

use rand::Rng;

use crate::config::Config;
use crate::entity::item::ItemKind;
use crate::geometry::{chunk_of, facing_vector, normalize_degrees};
use crate::ids::PlayerId;
use crate::sim::{collision, spawn, weapons};
use crate::state::SessionState;
use crate::worldgen;

pub fn run(state: &mut SessionState, config: &Config, rng: &mut impl Rng, dt: f64, now: f64) {
    let player_ids: Vec<PlayerId> = state.players.keys().cloned().collect();

    for pid in player_ids {
        let is_connected = state.players.get(&pid).map(|p| p.is_connected).unwrap_or(false);
        if !is_connected {
            continue;
        }

        maybe_respawn(state, config, rng, &pid);
        tick_timers(state, &pid, dt, config);
        recharge_ammo(state, &pid, dt, config);
        drain_item_uses(state, &pid, config);
        drain_purchases(state, &pid, config);
        apply_input(state, config, rng, &pid, dt, now);
        lazy_generate_around(state, config, &pid);
    }
}

fn maybe_respawn(state: &mut SessionState, config: &Config, rng: &mut impl Rng, pid: &PlayerId) {
    let needs_respawn = state.respawn_queue.contains(pid)
        && state.players.get(pid).map(|p| !p.is_alive).unwrap_or(false);
    if !needs_respawn {
        return;
    }
    let reference = state.players.get(pid).unwrap().position;
    let spawn_position = spawn::pick_spawn_point(state, config, rng, reference);
    let player = state.players.get_mut(pid).unwrap();
    player.respawn_at(spawn_position, config);
    state.respawn_queue.remove(pid);
}

fn tick_timers(state: &mut SessionState, pid: &PlayerId, dt: f64, _config: &Config) {
    let Some(player) = state.players.get_mut(pid) else { return };
    player.invulnerable_timer = (player.invulnerable_timer - dt).max(0.0);
    player.night_vision_timer = (player.night_vision_timer - dt).max(0.0);
}

fn recharge_ammo(state: &mut SessionState, pid: &PlayerId, dt: f64, config: &Config) {
    let Some(player) = state.players.get_mut(pid) else { return };
    if !player.is_alive || !player.selected_weapon.has_native_reservoir() {
        return;
    }
    let weapon = player.selected_weapon;
    let max = config.blaster_max_reservoir;
    let current = *player.bullets_left_by_weapon.get(&weapon).unwrap_or(&0);
    if current >= max {
        return;
    }
    player.recharge_accumulator += dt;
    let mut bullets = current;
    while player.recharge_accumulator >= config.blaster_recharge_time && bullets < max {
        bullets += 1;
        player.recharge_accumulator -= config.blaster_recharge_time;
    }
    player.bullets_left_by_weapon.insert(weapon, bullets);
}

fn drain_item_uses(state: &mut SessionState, pid: &PlayerId, config: &Config) {
    let uses = state.pending_item_uses.remove(pid).unwrap_or_default();
    let Some(player) = state.players.get_mut(pid) else { return };
    if !player.is_alive {
        return;
    }
    for idx in uses {
        let Some(kind) = ItemKind::ALL.get(idx).copied() else { continue };
        if player.inventory.quantity_of(kind) == 0 {
            continue; // SimError::InvalidItemUse, dropped silently
        }
        if let Some(weapon) = kind.grants_weapon() {
            player.selected_weapon = weapon;
            continue;
        }
        match kind {
            ItemKind::AidKit => {
                player.inventory.consume(ItemKind::AidKit, 1);
                player.heal(config.aid_kit_heal_amount, config);
            }
            ItemKind::Goggles => {
                player.inventory.consume(ItemKind::Goggles, 1);
                player.night_vision_timer += config.goggles_active_time;
            }
            _ => {} // ammo packs aren't directly "used"
        }
    }
}

fn drain_purchases(state: &mut SessionState, pid: &PlayerId, config: &Config) {
    let purchases = state.pending_purchases.remove(pid).unwrap_or_default();
    if purchases.is_empty() {
        return;
    }
    let Some((position, chunk, is_alive)) = state.players.get(pid).map(|p| {
        (p.position, chunk_of(p.position.x, p.position.y, config.chunk_size), p.is_alive)
    }) else {
        return;
    };
    if !is_alive {
        return;
    }

    let in_shop_range = state
        .shops_by_chunk
        .get(&chunk)
        .map(|shops| shops.values().any(|s| s.position.distance_to(position) <= config.shop_size / 2.0))
        .unwrap_or(false);
    if !in_shop_range {
        return;
    }

    for idx in purchases {
        let Some(kind) = ItemKind::ALL.get(idx).copied() else { continue };
        let Some(shops) = state.shops_by_chunk.get_mut(&chunk) else { continue };
        let Some(shop) = shops
            .values_mut()
            .find(|s| s.position.distance_to(position) <= config.shop_size / 2.0 && s.inventory.contains_key(&kind))
        else {
            continue; // SimError::InvalidPurchase
        };
        let listing = shop.inventory.get_mut(&kind).unwrap();
        let player = state.players.get_mut(pid).unwrap();
        if listing.quantity == 0 || listing.price > player.money {
            continue;
        }
        listing.quantity -= 1;
        player.money -= listing.price;
        player.inventory.add(kind, listing.pack_size);
    }
}

fn apply_input(state: &mut SessionState, config: &Config, rng: &mut impl Rng, pid: &PlayerId, dt: f64, now: f64) {
    let Some(input) = state.pending_inputs.get(pid).cloned() else { return };
    let Some(player) = state.players.get_mut(pid) else { return };
    if !player.is_alive {
        return;
    }

    if input.left {
        player.rotation = normalize_degrees(player.rotation - config.player_rotation_speed * dt);
    }
    if input.right {
        player.rotation = normalize_degrees(player.rotation + config.player_rotation_speed * dt);
    }

    if input.shoot {
        let _ = weapons::resolve_shoot(state, config, rng, pid, now);
    }

    if input.forward || input.backward {
        let Some(player) = state.players.get(pid) else { return };
        let sign = if input.forward { 1.0 } else { -1.0 };
        let intended = facing_vector(player.rotation).scale(config.player_speed * dt * sign);
        let chunk = chunk_of(player.position.x, player.position.y, config.chunk_size);
        let neighborhood: Vec<_> = chunk.neighborhood().to_vec();
        let collidables = collision::gather_collidables(state, config, &neighborhood, Some(pid));
        let delta = collision::resolve_sliding_collision(player.position, intended, &collidables);
        let player = state.players.get_mut(pid).unwrap();
        player.position = player.position.add(delta);
    }
}

fn lazy_generate_around(state: &mut SessionState, config: &Config, pid: &PlayerId) {
    let Some(position) = state.players.get(pid).map(|p| p.position) else { return };
    let center = chunk_of(position.x, position.y, config.chunk_size);
    for chunk in center.neighborhood() {
        worldgen::ensure_chunk_generated(state, chunk, config, position);
    }
}
