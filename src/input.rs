//! The inbound input message (`spec.md` §6) and the edge-triggered key
//! bookkeeping the orchestrator performs on it before each tick sees it.

use serde::{Deserialize, Serialize};

use crate::entity::item::ItemKind;

/// One connection's latest input snapshot. `item_keys`/`purchase_keys` are
/// fixed-arity boolean arrays indexed by item id enumeration
/// (`ItemKind::ALL` order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMessage {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
    pub item_keys: Vec<bool>,
    pub purchase_keys: Vec<bool>,
}

impl Default for InputMessage {
    fn default() -> Self {
        let arity = ItemKind::ALL.len();
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            shoot: false,
            item_keys: vec![false; arity],
            purchase_keys: vec![false; arity],
        }
    }
}

/// Diffs `new` against `old`, appending the item id of every index that
/// transitioned `true -> false` to `out` (`spec.md` §4.7). Edge-triggered on
/// release, not press, so a held key doesn't re-fire every tick.
fn edge_released(old: &[bool], new: &[bool], out: &mut Vec<usize>) {
    for (i, (&was, &is)) in old.iter().zip(new.iter()).enumerate() {
        if was && !is {
            out.push(i);
        }
    }
}

/// Applies the orchestrator's edge-trigger bookkeeping: latest input
/// replaces the stored one; released item/purchase keys are appended to the
/// pending-use/pending-purchase queues.
pub fn accumulate_edge_triggers(
    old: &InputMessage,
    new: &InputMessage,
    pending_item_uses: &mut Vec<usize>,
    pending_purchases: &mut Vec<usize>,
) {
    edge_released(&old.item_keys, &new.item_keys, pending_item_uses);
    edge_released(&old.purchase_keys, &new.purchase_keys, pending_purchases);
}
