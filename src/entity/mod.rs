//! Value types for players, enemies, bullets, walls, bonuses, shops, and
//! their invariants, clone, and visibility predicates (`spec.md` §4.2).
//!
//! Rather than inlining `match kind { ... }` branches at every call site
//! (the "duck-typed polymorphism" the source fell into, per `spec.md` §9),
//! each kind gets a tagged variant plus per-kind methods through the
//! `Visible` trait below.

pub mod bonus;
pub mod bullet;
pub mod enemy;
pub mod item;
pub mod player;
pub mod shop;
pub mod wall;

use crate::config::Config;
use crate::detection;
use crate::geometry::Vector2;
use crate::ids::BulletId;
use player::Player;

/// Implemented by every non-player entity kind to answer "is this visible
/// to `viewer` this tick". Bullets carry a fixed radius rather than a
/// config-looked-up size, since all weapon projectiles share one physical
/// size regardless of weapon kind.
pub trait Visible {
    fn is_visible_to(&self, viewer: &Player, config: &Config) -> bool;
}

impl Visible for wall::Wall {
    fn is_visible_to(&self, viewer: &Player, config: &Config) -> bool {
        detection::is_wall_visible_to(self, viewer, config)
    }
}

impl Visible for enemy::Enemy {
    fn is_visible_to(&self, viewer: &Player, config: &Config) -> bool {
        let size = config.enemy_config(self.kind).size;
        detection::is_point_visible_to(self.position, size, viewer, config)
    }
}

impl Visible for bullet::Bullet {
    fn is_visible_to(&self, viewer: &Player, config: &Config) -> bool {
        detection::is_point_visible_to(self.position, config.bullet_radius * 2.0, viewer, config)
    }
}

impl Visible for shop::Shop {
    fn is_visible_to(&self, viewer: &Player, config: &Config) -> bool {
        detection::is_point_visible_to(self.position, config.shop_size, viewer, config)
    }
}

impl Visible for player::Player {
    fn is_visible_to(&self, viewer: &Player, config: &Config) -> bool {
        // A player running on night vision gives away their own position to
        // no one, themselves included (`spec.md` §4.6 step 3).
        self.night_vision_timer <= 0.0 && detection::is_point_visible_to(self.position, config.player_radius * 2.0, viewer, config)
    }
}

impl Visible for bonus::Bonus {
    fn is_visible_to(&self, viewer: &Player, config: &Config) -> bool {
        // A dropped bonus is always visible to its dropper, regardless of
        // detection cone (`spec.md` §9, Design Note (c)).
        if self.dropped_by.as_ref() == Some(&viewer.id) {
            return true;
        }
        let size = match self.kind {
            bonus::BonusKind::AidKit => config.aid_kit_radius * 2.0,
            bonus::BonusKind::Goggles => config.goggles_radius * 2.0,
            bonus::BonusKind::Chest => config.chest_radius * 2.0,
        };
        detection::is_point_visible_to(self.position, size, viewer, config)
    }
}

/// Returns the muzzle point: a fixed offset rotated around the shooter by
/// their facing rotation (`spec.md` §4.4.c).
pub fn muzzle_point(position: Vector2, rotation: f64, config: &Config) -> Vector2 {
    position
        .add(config.muzzle_offset)
        .rotate_around(position, rotation)
}

/// Allocates the next bullet id from the session-local counter (kept here,
/// rather than duplicated at every bullet-spawning call site).
pub fn next_bullet_id(counter: &mut crate::ids::IdAllocator) -> BulletId {
    BulletId(counter.next())
}
