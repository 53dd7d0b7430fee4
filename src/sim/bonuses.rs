//! Ground-item pickup and expiry (`spec.md` §4.4 P4).

use crate::config::Config;
use crate::entity::bonus::BonusKind;
use crate::ids::{BonusId, PlayerId};
use crate::state::SessionState;

pub fn run(state: &mut SessionState, config: &Config, now: f64) {
    let bonus_ids: Vec<BonusId> = state.bonuses.keys().copied().collect();
    let mut to_remove: Vec<BonusId> = Vec::new();

    for id in bonus_ids {
        let Some(bonus) = state.bonuses.get(&id) else { continue };

        if let Some(picked_up_at) = bonus.picked_up_at {
            if now - picked_up_at > config.dead_entities_cache_timeout {
                to_remove.push(id);
            }
            continue;
        }

        if let Some(dropped_at) = bonus.dropped_at {
            if now - dropped_at > config.player_drop_inventory_lifetime {
                to_remove.push(id);
                continue;
            }
        }

        let radius = bonus.radius(config);
        let kind = bonus.kind;
        let position = bonus.position;

        let picker: Option<PlayerId> = state
            .players
            .values()
            .find(|p| {
                p.is_alive && p.is_connected && p.position.distance_to(position) < config.player_radius + radius
            })
            .map(|p| p.id.clone());

        let Some(picker) = picker else { continue };

        let inventory = state.bonuses.get(&id).and_then(|b| b.inventory.clone());
        let player = state.players.get_mut(&picker).unwrap();
        match kind {
            BonusKind::AidKit => player.heal(config.aid_kit_heal_amount, config),
            BonusKind::Goggles => player.night_vision_timer += config.goggles_active_time,
            BonusKind::Chest => {
                if let Some(inv) = inventory {
                    player.inventory.merge_from(&inv);
                }
            }
        }

        let bonus = state.bonuses.get_mut(&id).unwrap();
        bonus.picked_up_by = Some(picker);
        bonus.picked_up_at = Some(now);
    }

    for id in to_remove {
        state.bonuses.remove(&id);
    }
}
