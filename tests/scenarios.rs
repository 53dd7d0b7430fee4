//! End-to-end scenarios exercised against `SessionState` directly with a
//! fixed `Config`, bypassing the session/orchestrator wiring.

use std::collections::HashMap;

use arena_server::config::Config;
use arena_server::delta;
use arena_server::entity::bonus::BonusKind;
use arena_server::entity::bullet::Owner;
use arena_server::entity::enemy::{Enemy, EnemyKind};
use arena_server::entity::item::{Inventory, ItemKind, WeaponKind};
use arena_server::entity::player::Player;
use arena_server::entity::wall::{Orientation, Wall};
use arena_server::geometry::{chunk_of, Vector2};
use arena_server::ids::{EnemyId, PlayerId, WallId};
use arena_server::input::InputMessage;
use arena_server::sim::{self, combat};
use arena_server::state::SessionState;

fn new_player(state: &mut SessionState, config: &Config, name: &str, position: Vector2) -> PlayerId {
    let id = PlayerId(name.to_string());
    let player = Player::new(id.clone(), name.to_string(), position, config);
    state.players.insert(id.clone(), player);
    id
}

fn set_input(state: &mut SessionState, id: &PlayerId, input: InputMessage) {
    state.pending_inputs.insert(id.clone(), input);
}

fn forward_input() -> InputMessage {
    InputMessage {
        forward: true,
        ..InputMessage::default()
    }
}

fn shoot_input() -> InputMessage {
    InputMessage {
        shoot: true,
        ..InputMessage::default()
    }
}

/// Marks every chunk in `position`'s 3x3 neighborhood as already generated,
/// so `sim::tick`'s lazy world generation can't drop a random wall, tower,
/// or shop into hand-built test geometry.
fn suppress_worldgen_around(state: &mut SessionState, config: &Config, position: Vector2) {
    let center = chunk_of(position.x, position.y, config.chunk_size);
    for chunk in center.neighborhood() {
        state.generated_chunks.insert(chunk);
    }
}

/// Scenario 1: a blaster bullet travelling toward a one-life Soldier kills
/// it and credits the shooter.
#[test]
fn blaster_kill_credits_shooter() {
    let config = Config::default();
    let mut state = SessionState::new(1);

    let pid = new_player(&mut state, &config, "p1", Vector2::new(0.0, 0.0));
    suppress_worldgen_around(&mut state, &config, Vector2::new(0.0, 0.0));
    set_input(&mut state, &pid, shoot_input());

    let chunk = chunk_of(0.0, 30.0, config.chunk_size);
    let enemy_id = EnemyId(state.id_alloc.next());
    state.enemies_by_chunk.entry(chunk).or_default().insert(
        enemy_id,
        Enemy {
            id: enemy_id,
            position: Vector2::new(0.0, 30.0),
            rotation: 0.0,
            kind: EnemyKind::Soldier,
            wall_id: None,
            direction: 1,
            lives: config.enemy_config(EnemyKind::Soldier).lives,
            shoot_delay: 0.0,
            is_alive: true,
            dead_timer: 0.0,
        },
    );

    sim::tick(&mut state, &config, 1.0 / 30.0, 0.0);

    assert!(
        state.bullets.values().any(|b| b.is_owned_by_player(&pid) && b.weapon_kind == WeaponKind::Blaster),
        "resolve_shoot must have spawned a blaster bullet"
    );

    let enemy = &state.enemies_by_chunk[&chunk][&enemy_id];
    assert!(!enemy.is_alive, "soldier should have died to the swept bullet segment");

    let shooter = &state.players[&pid];
    assert_eq!(shooter.money, 20);
    assert_eq!(shooter.score, 20);
    assert_eq!(shooter.kills, 1);
}

/// Scenario 2: a player sliding along a vertical wall stops flush against
/// it rather than passing through, and doesn't drift off-axis.
#[test]
fn sliding_collision_stops_at_wall() {
    let config = Config::default();
    let mut state = SessionState::new(2);

    let wall_position = Vector2::new(100.0, 0.0);
    let wall_chunk = chunk_of(wall_position.x, wall_position.y, config.chunk_size);
    let wall_id = WallId(state.id_alloc.next());
    state.walls_by_chunk.entry(wall_chunk).or_default().insert(
        wall_id,
        Wall::new(wall_id, wall_position, 30.0, 400.0, Orientation::Vertical),
    );

    // `facing_vector`'s screen-space convention (`dx = -sin, dy = cos`) puts
    // due east at rotation 270, not 90 — see `geometry::facing_vector`.
    let pid = new_player(&mut state, &config, "p1", Vector2::new(50.0, 0.0));
    suppress_worldgen_around(&mut state, &config, Vector2::new(50.0, 0.0));
    state.players.get_mut(&pid).unwrap().rotation = 270.0;
    set_input(&mut state, &pid, forward_input());

    for _ in 0..40 {
        sim::tick(&mut state, &config, 1.0 / 30.0, 0.0);
    }

    let player = &state.players[&pid];
    assert!(
        player.position.x <= 100.0 - 15.0 - config.player_radius + 1e-6,
        "player must not penetrate the wall's expanded AABB, got x={}",
        player.position.x
    );
    assert!(player.position.y.abs() < 1e-6, "forward-only input must not introduce lateral drift");
}

/// Scenario 3: a shotgun blast creates exactly `ShotgunNumPellets` bullets,
/// each an even damage share, all inactive on creation, damage resolved the
/// same tick.
#[test]
fn shotgun_splits_damage_across_pellets() {
    let config = Config::default();
    let mut state = SessionState::new(3);

    let pid = new_player(&mut state, &config, "p1", Vector2::new(0.0, 0.0));
    suppress_worldgen_around(&mut state, &config, Vector2::new(0.0, 0.0));
    state.players.get_mut(&pid).unwrap().selected_weapon = WeaponKind::Shotgun;
    state.players.get_mut(&pid).unwrap().inventory.add(ItemKind::ShotgunAmmo, 10);
    set_input(&mut state, &pid, shoot_input());

    let chunk = chunk_of(0.0, 15.0, config.chunk_size);
    let enemy_id = EnemyId(state.id_alloc.next());
    state.enemies_by_chunk.entry(chunk).or_default().insert(
        enemy_id,
        Enemy {
            id: enemy_id,
            position: Vector2::new(0.0, 15.0),
            rotation: 0.0,
            kind: EnemyKind::Lieutenant,
            wall_id: None,
            direction: 1,
            lives: config.enemy_config(EnemyKind::Lieutenant).lives,
            shoot_delay: 0.0,
            is_alive: true,
            dead_timer: 0.0,
        },
    );

    sim::tick(&mut state, &config, 1.0 / 30.0, 0.0);

    let pellets: Vec<_> = state
        .bullets
        .values()
        .filter(|b| b.is_owned_by_player(&pid))
        .collect();
    assert_eq!(pellets.len(), config.shotgun_num_pellets as usize);
    let expected_damage = config.weapon_config(WeaponKind::Shotgun).damage / config.shotgun_num_pellets as f64;
    for pellet in &pellets {
        assert!((pellet.damage - expected_damage).abs() < 1e-9);
        assert!(!pellet.is_active, "spread pellets are created inactive");
    }

    let enemy = &state.enemies_by_chunk[&chunk][&enemy_id];
    assert!(
        enemy.lives < config.enemy_config(EnemyKind::Lieutenant).lives,
        "an enemy standing directly on the muzzle line must take damage the same tick"
    );
}

/// Scenario 4: rocket splash damage falls off linearly with distance and
/// cuts off exactly at the blast radius.
#[test]
fn rocket_splash_falls_off_linearly() {
    let config = Config::default();
    let mut state = SessionState::new(4);
    let mut rng = state.tick_rng();

    let radius = config.rocket_launcher_damage_radius;
    let max_damage = config.rocket_launcher_damage;
    let distances = [50.0, 100.0, 149.0, 150.0, 151.0];

    let mut enemy_ids = Vec::new();
    for d in distances {
        let chunk = chunk_of(d, 0.0, config.chunk_size);
        let id = EnemyId(state.id_alloc.next());
        state.enemies_by_chunk.entry(chunk).or_default().insert(
            id,
            Enemy {
                id,
                position: Vector2::new(d, 0.0),
                rotation: 0.0,
                kind: EnemyKind::Soldier,
                wall_id: None,
                direction: 1,
                lives: 1000.0,
                shoot_delay: 0.0,
                is_alive: true,
                dead_timer: 0.0,
            },
        );
        enemy_ids.push((d, chunk, id));
    }

    let owner = Owner::Enemy(EnemyId(999));
    combat::apply_splash_damage(
        &mut state,
        &config,
        &mut rng,
        &owner,
        Vector2::new(0.0, 0.0),
        radius,
        max_damage,
        &combat::HitSet::default(),
        0.0,
    );

    for (d, chunk, id) in enemy_ids {
        let enemy = &state.enemies_by_chunk[&chunk][&id];
        let taken = 1000.0 - enemy.lives;
        if d >= radius {
            assert_eq!(taken, 0.0, "enemy at or beyond the blast radius ({d}) must take no damage");
        } else {
            let expected = max_damage * (1.0 - d / radius);
            assert!((taken - expected).abs() < 1e-9, "distance {d}: expected {expected}, took {taken}");
        }
    }
}

/// Scenario 5: a viewer running night vision sees a stranger within sight
/// radius, but relaying the stranger's own torch visibility is suppressed.
#[test]
fn night_vision_suppresses_relay() {
    let config = Config::default();
    let mut state = SessionState::new(5);

    let viewer_id = new_player(&mut state, &config, "viewer", Vector2::new(0.0, 0.0));
    state.players.get_mut(&viewer_id).unwrap().night_vision_timer = config.goggles_active_time;

    let stranger_id = new_player(&mut state, &config, "stranger", Vector2::new(500.0, 0.0));
    assert_eq!(state.players[&stranger_id].night_vision_timer, 0.0);

    let chunk = chunk_of(650.0, 0.0, config.chunk_size);
    let enemy_id = EnemyId(state.id_alloc.next());
    state.enemies_by_chunk.entry(chunk).or_default().insert(
        enemy_id,
        Enemy {
            id: enemy_id,
            position: Vector2::new(650.0, 0.0),
            rotation: 0.0,
            kind: EnemyKind::Soldier,
            wall_id: None,
            direction: 1,
            lives: 1.0,
            shoot_delay: 0.0,
            is_alive: true,
            dead_timer: 0.0,
        },
    );

    let mut snapshots = HashMap::new();
    let delta = delta::build_delta(&state, &config, &viewer_id, &mut snapshots, 0).expect("delta must not be empty");

    assert!(
        delta.players.added.contains_key(&stranger_id.to_string()),
        "viewer's own night vision must directly reach the stranger"
    );
    assert!(
        delta.enemies.added.is_empty(),
        "the enemy only the stranger's torch can see must not be relayed while the viewer uses night vision"
    );
}

/// Scenario 6: a player killed by splash damage drops a chest carrying
/// their inventory, which another player can pick up additively.
#[test]
fn player_death_drops_chest_and_is_picked_up() {
    let config = Config::default();
    let mut state = SessionState::new(6);

    let victim_id = new_player(&mut state, &config, "victim", Vector2::new(0.0, 0.0));
    {
        let victim = state.players.get_mut(&victim_id).unwrap();
        victim.lives = 4.0;
        victim.invulnerable_timer = 0.0;
        victim.inventory = Inventory::default();
        victim.inventory.add(ItemKind::Blaster, 1);
        victim.inventory.add(ItemKind::BlasterAmmo, 3);
        victim.inventory.add(ItemKind::AidKit, 2);
    }

    let mut rng = state.tick_rng();
    let owner = Owner::Enemy(EnemyId(999));
    combat::apply_splash_damage(
        &mut state,
        &config,
        &mut rng,
        &owner,
        Vector2::new(0.0, 0.0),
        config.rocket_launcher_damage_radius,
        config.rocket_launcher_damage,
        &combat::HitSet::default(),
        10.0,
    );

    let victim = &state.players[&victim_id];
    assert!(!victim.is_alive);
    assert_eq!(victim.lives, 0.0);

    let chest = state
        .bonuses
        .values()
        .find(|b| b.kind == BonusKind::Chest && b.dropped_by.as_ref() == Some(&victim_id))
        .expect("death must drop a chest");
    assert_eq!(chest.position, Vector2::new(0.0, 0.0));
    let chest_inventory = chest.inventory.as_ref().expect("chest carries the victim's inventory");
    assert_eq!(chest_inventory.quantity_of(ItemKind::Blaster), 1);
    assert_eq!(chest_inventory.quantity_of(ItemKind::BlasterAmmo), 3);
    assert_eq!(chest_inventory.quantity_of(ItemKind::AidKit), 2);

    let picker_id = new_player(&mut state, &config, "picker", Vector2::new(5.0, 0.0));
    sim::bonuses::run(&mut state, &config, 11.0);

    let picker = &state.players[&picker_id];
    assert_eq!(picker.inventory.quantity_of(ItemKind::Blaster), 2, "picker started with 1 and merges the chest's 1");
    assert_eq!(picker.inventory.quantity_of(ItemKind::BlasterAmmo), 3);
    assert_eq!(picker.inventory.quantity_of(ItemKind::AidKit), 2);
}

/// Quantified invariant: player lives never leave `[0, PlayerLives]` across
/// heavy splash damage, even when max damage exceeds remaining lives.
#[test]
fn lives_stay_within_bounds_under_overkill_damage() {
    let config = Config::default();
    let mut state = SessionState::new(7);
    let pid = new_player(&mut state, &config, "p1", Vector2::new(0.0, 0.0));
    state.players.get_mut(&pid).unwrap().invulnerable_timer = 0.0;

    let mut rng = state.tick_rng();
    let owner = Owner::Enemy(EnemyId(999));
    combat::apply_splash_damage(
        &mut state,
        &config,
        &mut rng,
        &owner,
        Vector2::new(0.0, 0.0),
        config.rocket_launcher_damage_radius,
        config.rocket_launcher_damage * 50.0,
        &combat::HitSet::default(),
        0.0,
    );

    let player = &state.players[&pid];
    assert!(player.lives >= 0.0 && player.lives <= config.player_lives);
}
