use serde::{Deserialize, Serialize};

use crate::geometry::Vector2;
use crate::ids::{EnemyId, WallId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Soldier,
    Lieutenant,
    Tower,
}

impl EnemyKind {
    pub fn fires_rockets(self) -> bool {
        matches!(self, EnemyKind::Tower)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub position: Vector2,
    pub rotation: f64,
    pub kind: EnemyKind,
    /// Wall this enemy patrols along. `None` for Towers and for enemies
    /// whose wall reference turned out to be unresolvable (`spec.md` §9).
    pub wall_id: Option<WallId>,
    pub direction: i32,
    pub lives: f64,
    pub shoot_delay: f64,
    pub is_alive: bool,
    /// Grace period countdown before a dead enemy is removed from its
    /// chunk.
    pub dead_timer: f64,
}

impl Enemy {
    pub fn bounding_radius(&self, config: &crate::config::Config) -> f64 {
        config.enemy_config(self.kind).size / 2.0
    }
}
