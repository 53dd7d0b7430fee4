//! Immutable configuration bundle (`spec.md` §9, "Global mutable config").
//! Replaces the usual pile of process-wide constants with a value
//! constructed once and shared `Arc`-wise into every session, so sessions
//! can be tuned independently and tests stay parametric.

use std::collections::HashMap;

use crate::entity::enemy::EnemyKind;
use crate::entity::item::{ItemKind, WeaponKind};
use crate::geometry::Vector2;

#[derive(Debug, Clone, Copy)]
pub struct WeaponConfig {
    pub shoot_delay: f64,
    pub damage: f64,
    pub bullet_speed: f64,
    /// `None` means the projectile is a hitscan-style shot resolved in the
    /// same tick it's fired and never simulated as a moving bullet.
    pub lifetime: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct EnemyConfig {
    pub size: f64,
    pub lives: f64,
    pub shoot_delay: f64,
    pub dead_timer: f64,
    pub patrol_speed: f64,
    pub reward_money: i64,
    pub reward_score: i64,
    pub bullet_speed: f64,
    pub bullet_damage: f64,
    /// Chance a killed Soldier/Lieutenant drops a bonus at all; unused for
    /// Tower, which always drops a chest (`spec.md` §4.4.d).
    pub bonus_drop_chance: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ShopItemConfig {
    pub spawn_chance: f64,
    pub qty_min: u32,
    pub qty_max: u32,
    pub price: i64,
    pub pack_size: u32,
}

/// Independent per-item-kind draw used both for shop stock rolls and for
/// the tower's chest drop table (`spec.md` §4.4.d).
#[derive(Debug, Clone, Copy)]
pub struct DropTableEntry {
    pub chance: f64,
    pub qty_min: u32,
    pub qty_max: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub chunk_size: f64,
    pub game_loop_interval: f64,
    /// Upper bound on `dt` fed to a tick, per `spec.md` §9's "Time
    /// handling" note: caps teleport-after-stall.
    pub max_dt: f64,

    pub player_radius: f64,
    pub player_speed: f64,
    pub player_rotation_speed: f64,
    pub player_lives: f64,
    pub player_spawn_invulnerability_time: f64,
    pub player_invulnerability_time: f64,
    pub player_reward: i64,
    pub player_drop_inventory_lifetime: f64,
    pub muzzle_offset: Vector2,

    pub blaster_max_reservoir: u32,
    pub blaster_recharge_time: f64,

    pub aid_kit_heal_amount: f64,
    pub goggles_active_time: f64,
    pub night_vision_detection_radius: f64,
    pub torch_offset: Vector2,
    pub torch_radius: f64,
    pub sight_radius: f64,

    pub dead_entities_cache_timeout: f64,

    pub wall_width: f64,
    pub wall_long_min: f64,
    pub wall_long_max: f64,
    pub min_walls_per_kpx2: f64,
    pub max_walls_per_kpx2: f64,
    pub wall_safety_margin: f64,

    pub enemy_spawn_chance_per_wall: f64,
    pub enemy_lieutenant_chance: f64,
    pub enemy_tower_rotation_speed: f64,
    pub enemy_goggles_drop_chance: f64,

    pub shotgun_num_pellets: u32,
    pub shotgun_spread_angle: f64,
    pub shotgun_range: f64,

    pub rocket_launcher_damage_radius: f64,
    pub rocket_launcher_damage: f64,

    pub bullet_radius: f64,
    pub shop_size: f64,
    pub aid_kit_radius: f64,
    pub goggles_radius: f64,
    pub chest_radius: f64,

    pub weapon_configs: HashMap<WeaponKind, WeaponConfig>,
    pub enemy_configs: HashMap<EnemyKind, EnemyConfig>,
    pub shop_item_configs: HashMap<ItemKind, ShopItemConfig>,
    /// Drop table for a killed Soldier/Lieutenant, rolled only after the
    /// kind-specific `EnemyConfig`-external `drop_chance` succeeds: secondary
    /// roll between Goggles (`enemy_goggles_drop_chance`) and AidKit.
    pub tower_chest_drop_table: HashMap<ItemKind, DropTableEntry>,
}

impl Config {
    pub fn weapon_config(&self, weapon: WeaponKind) -> &WeaponConfig {
        self.weapon_configs
            .get(&weapon)
            .expect("every WeaponKind has a config entry")
    }

    pub fn enemy_config(&self, kind: EnemyKind) -> &EnemyConfig {
        self.enemy_configs
            .get(&kind)
            .expect("every EnemyKind has a config entry")
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut weapon_configs = HashMap::new();
        weapon_configs.insert(
            WeaponKind::Blaster,
            WeaponConfig {
                shoot_delay: 0.2,
                damage: 10.0,
                bullet_speed: 420.0,
                lifetime: Some(2.5),
            },
        );
        weapon_configs.insert(
            WeaponKind::Shotgun,
            WeaponConfig {
                shoot_delay: 0.8,
                damage: 80.0,
                bullet_speed: 0.0,
                lifetime: None,
            },
        );
        weapon_configs.insert(
            WeaponKind::RocketLauncher,
            WeaponConfig {
                shoot_delay: 1.2,
                damage: 100.0,
                bullet_speed: 250.0,
                lifetime: Some(3.0),
            },
        );
        weapon_configs.insert(
            WeaponKind::Railgun,
            WeaponConfig {
                shoot_delay: 1.5,
                damage: 120.0,
                bullet_speed: 0.0,
                lifetime: None,
            },
        );

        let mut enemy_configs = HashMap::new();
        enemy_configs.insert(
            EnemyKind::Soldier,
            EnemyConfig {
                size: 40.0,
                lives: 1.0,
                shoot_delay: 1.0,
                dead_timer: 3.0,
                patrol_speed: 60.0,
                reward_money: 20,
                reward_score: 20,
                bullet_speed: 300.0,
                bullet_damage: 10.0,
                bonus_drop_chance: 0.3,
            },
        );
        enemy_configs.insert(
            EnemyKind::Lieutenant,
            EnemyConfig {
                size: 44.0,
                lives: 3.0,
                shoot_delay: 0.8,
                dead_timer: 3.0,
                patrol_speed: 70.0,
                reward_money: 40,
                reward_score: 40,
                bullet_speed: 340.0,
                bullet_damage: 14.0,
                bonus_drop_chance: 0.45,
            },
        );
        enemy_configs.insert(
            EnemyKind::Tower,
            EnemyConfig {
                size: 70.0,
                lives: 10.0,
                shoot_delay: 1.5,
                dead_timer: 5.0,
                patrol_speed: 0.0,
                reward_money: 100,
                reward_score: 100,
                bullet_speed: 250.0,
                bullet_damage: 100.0,
                bonus_drop_chance: 0.0,
            },
        );

        let mut shop_item_configs = HashMap::new();
        shop_item_configs.insert(
            ItemKind::BlasterAmmo,
            ShopItemConfig { spawn_chance: 0.9, qty_min: 1, qty_max: 4, price: 15, pack_size: 6 },
        );
        shop_item_configs.insert(
            ItemKind::ShotgunAmmo,
            ShopItemConfig { spawn_chance: 0.7, qty_min: 1, qty_max: 3, price: 25, pack_size: 4 },
        );
        shop_item_configs.insert(
            ItemKind::RocketAmmo,
            ShopItemConfig { spawn_chance: 0.4, qty_min: 1, qty_max: 2, price: 60, pack_size: 2 },
        );
        shop_item_configs.insert(
            ItemKind::RailgunAmmo,
            ShopItemConfig { spawn_chance: 0.4, qty_min: 1, qty_max: 2, price: 60, pack_size: 2 },
        );
        shop_item_configs.insert(
            ItemKind::Shotgun,
            ShopItemConfig { spawn_chance: 0.3, qty_min: 1, qty_max: 1, price: 150, pack_size: 1 },
        );
        shop_item_configs.insert(
            ItemKind::RocketLauncher,
            ShopItemConfig { spawn_chance: 0.2, qty_min: 1, qty_max: 1, price: 300, pack_size: 1 },
        );
        shop_item_configs.insert(
            ItemKind::Railgun,
            ShopItemConfig { spawn_chance: 0.2, qty_min: 1, qty_max: 1, price: 350, pack_size: 1 },
        );
        shop_item_configs.insert(
            ItemKind::AidKit,
            ShopItemConfig { spawn_chance: 0.8, qty_min: 1, qty_max: 3, price: 30, pack_size: 1 },
        );
        shop_item_configs.insert(
            ItemKind::Goggles,
            ShopItemConfig { spawn_chance: 0.5, qty_min: 1, qty_max: 1, price: 50, pack_size: 1 },
        );

        let mut tower_chest_drop_table = HashMap::new();
        tower_chest_drop_table.insert(ItemKind::BlasterAmmo, DropTableEntry { chance: 0.9, qty_min: 2, qty_max: 6 });
        tower_chest_drop_table.insert(ItemKind::ShotgunAmmo, DropTableEntry { chance: 0.4, qty_min: 1, qty_max: 2 });
        tower_chest_drop_table.insert(ItemKind::RocketAmmo, DropTableEntry { chance: 0.3, qty_min: 1, qty_max: 1 });
        tower_chest_drop_table.insert(ItemKind::AidKit, DropTableEntry { chance: 0.6, qty_min: 1, qty_max: 2 });
        tower_chest_drop_table.insert(ItemKind::Goggles, DropTableEntry { chance: 0.3, qty_min: 1, qty_max: 1 });

        Config {
            chunk_size: 2000.0,
            game_loop_interval: 1.0 / 30.0,
            max_dt: 0.25,

            player_radius: 20.0,
            player_speed: 150.0,
            player_rotation_speed: 180.0,
            player_lives: 100.0,
            player_spawn_invulnerability_time: 3.0,
            player_invulnerability_time: 1.0,
            player_reward: 50,
            player_drop_inventory_lifetime: 30.0,
            muzzle_offset: Vector2::new(-10.0, 20.0),

            blaster_max_reservoir: 6,
            blaster_recharge_time: 1.0,

            aid_kit_heal_amount: 30.0,
            goggles_active_time: 20.0,
            night_vision_detection_radius: 80.0,
            torch_offset: Vector2::new(0.0, 10.0),
            torch_radius: 220.0,
            sight_radius: 600.0,

            dead_entities_cache_timeout: 2.0,

            wall_width: 30.0,
            wall_long_min: 200.0,
            wall_long_max: 300.0,
            min_walls_per_kpx2: 4.0,
            max_walls_per_kpx2: 10.0,
            wall_safety_margin: 60.0,

            enemy_spawn_chance_per_wall: 0.5,
            enemy_lieutenant_chance: 0.3,
            enemy_tower_rotation_speed: 90.0,
            enemy_goggles_drop_chance: 0.35,

            shotgun_num_pellets: 8,
            shotgun_spread_angle: 30.0,
            shotgun_range: 300.0,

            rocket_launcher_damage_radius: 150.0,
            rocket_launcher_damage: 100.0,

            bullet_radius: 5.0,
            shop_size: 80.0,
            aid_kit_radius: 14.0,
            goggles_radius: 14.0,
            chest_radius: 18.0,

            weapon_configs,
            enemy_configs,
            shop_item_configs,
            tower_chest_drop_table,
        }
    }
}
