use serde::{Deserialize, Serialize};

use crate::entity::item::WeaponKind;
use crate::geometry::Vector2;
use crate::ids::{BulletId, PlayerId};

/// A bullet's owner: either a player (PvE/PvP fire) or an enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Owner {
    Player(PlayerId),
    Enemy(crate::ids::EnemyId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: BulletId,
    pub position: Vector2,
    pub velocity: Vector2,
    pub owner: Owner,
    pub is_enemy: bool,
    pub weapon_kind: WeaponKind,
    pub spawn_time: f64,
    pub is_active: bool,
    /// `Some` once the bullet entered its post-impact grace period (also
    /// set, per `spec.md` §4.4.c, for spread/hitscan bullets that are
    /// created already inactive purely for client-side visualization).
    /// `None`, not a zero timestamp, means "still live" — `now` is `0.0` at
    /// the start of a fresh session clock, which would otherwise collide
    /// with the deleted marker.
    pub deleted_at: Option<f64>,
    /// Damage this single projectile carries. For spread weapons this is
    /// the per-pellet share, already divided evenly.
    pub damage: f64,
}

impl Bullet {
    pub fn is_owned_by_enemy(&self, enemy_id: crate::ids::EnemyId) -> bool {
        matches!(&self.owner, Owner::Enemy(id) if *id == enemy_id)
    }

    pub fn is_owned_by_player(&self, player_id: &PlayerId) -> bool {
        matches!(&self.owner, Owner::Player(id) if id == player_id)
    }

    pub fn mark_deleted(&mut self, now: f64) {
        self.is_active = false;
        self.deleted_at = Some(now);
    }
}
