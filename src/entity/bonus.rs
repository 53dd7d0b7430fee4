use serde::{Deserialize, Serialize};

use crate::entity::item::Inventory;
use crate::geometry::Vector2;
use crate::ids::{BonusId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    AidKit,
    Goggles,
    Chest,
}

/// A ground item: an aid kit, a pair of goggles, or a chest (full inventory
/// payload dropped on a kill).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bonus {
    pub id: BonusId,
    pub position: Vector2,
    pub kind: BonusKind,
    pub dropped_by: Option<PlayerId>,
    pub dropped_at: Option<f64>,
    pub picked_up_by: Option<PlayerId>,
    pub picked_up_at: Option<f64>,
    /// Only populated for `BonusKind::Chest`.
    pub inventory: Option<Inventory>,
}

impl Bonus {
    pub fn radius(&self, config: &crate::config::Config) -> f64 {
        match self.kind {
            BonusKind::AidKit => config.aid_kit_radius,
            BonusKind::Goggles => config.goggles_radius,
            BonusKind::Chest => config.chest_radius,
        }
    }
}
