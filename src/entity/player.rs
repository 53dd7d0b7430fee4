use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::entity::item::{Inventory, WeaponKind};
use crate::geometry::Vector2;
use crate::ids::PlayerId;

/// A connected or recently-connected player. Identity is the stable
/// external id handed in by the auth collaborator, not this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub position: Vector2,
    /// Degrees, normalized to `[0, 360)`.
    pub rotation: f64,

    pub lives: f64,
    pub score: i64,
    pub money: i64,
    pub kills: u32,

    pub is_alive: bool,
    pub is_connected: bool,

    /// Ammo reservoirs, only populated for weapons with a native reservoir
    /// (just the Blaster, per `spec.md` §3).
    pub bullets_left_by_weapon: HashMap<WeaponKind, u32>,
    pub recharge_accumulator: f64,

    pub invulnerable_timer: f64,
    pub night_vision_timer: f64,

    pub inventory: Inventory,
    pub selected_weapon: WeaponKind,
    pub last_shot_at: f64,
}

impl Player {
    pub fn new(id: PlayerId, display_name: String, position: Vector2, config: &Config) -> Self {
        let mut player = Player {
            id,
            display_name,
            position,
            rotation: 0.0,
            lives: config.player_lives,
            score: 0,
            money: 0,
            kills: 0,
            is_alive: true,
            is_connected: true,
            bullets_left_by_weapon: HashMap::new(),
            recharge_accumulator: 0.0,
            invulnerable_timer: config.player_spawn_invulnerability_time,
            night_vision_timer: 0.0,
            inventory: Inventory::starting(),
            selected_weapon: WeaponKind::Blaster,
            last_shot_at: f64::NEG_INFINITY,
        };
        player
            .bullets_left_by_weapon
            .insert(WeaponKind::Blaster, config.blaster_max_reservoir);
        player
    }

    /// Resets a player to spawn condition in place (`spec.md` §3 respawn
    /// invariant): full lives, fresh spawn invulnerability, starting
    /// inventory, full blaster reservoir.
    pub fn respawn_at(&mut self, position: Vector2, config: &Config) {
        self.position = position;
        self.rotation = 0.0;
        self.lives = config.player_lives;
        self.is_alive = true;
        self.invulnerable_timer = config.player_spawn_invulnerability_time;
        self.night_vision_timer = 0.0;
        self.inventory = Inventory::starting();
        self.selected_weapon = WeaponKind::Blaster;
        self.recharge_accumulator = 0.0;
        self.bullets_left_by_weapon.clear();
        self.bullets_left_by_weapon
            .insert(WeaponKind::Blaster, config.blaster_max_reservoir);
        self.last_shot_at = f64::NEG_INFINITY;
    }

    pub fn bounding_radius(config: &Config) -> f64 {
        config.player_radius
    }

    /// Ammo available for `weapon`: native reservoir count, or inventory
    /// ammo-pack count.
    pub fn ammo_available(&self, weapon: WeaponKind) -> u32 {
        if weapon.has_native_reservoir() {
            *self.bullets_left_by_weapon.get(&weapon).unwrap_or(&0)
        } else {
            match weapon.ammo_item() {
                Some(ammo) => self.inventory.quantity_of(ammo),
                None => 0,
            }
        }
    }

    /// Consumes one unit of ammo for `weapon` from whichever source backs
    /// it. Caller must have already checked `ammo_available(weapon) > 0`.
    pub fn consume_ammo(&mut self, weapon: WeaponKind) {
        if weapon.has_native_reservoir() {
            if let Some(count) = self.bullets_left_by_weapon.get_mut(&weapon) {
                *count = count.saturating_sub(1);
            }
        } else if let Some(ammo) = weapon.ammo_item() {
            self.inventory.consume(ammo, 1);
        }
    }

    pub fn heal(&mut self, amount: f64, config: &Config) {
        self.lives = (self.lives + amount).min(config.player_lives);
    }
}
