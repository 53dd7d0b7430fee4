//! Per-viewer delta view builder (`spec.md` §4.6): diffs the currently
//! visible entity set against each viewer's previous snapshot and emits
//! only what changed.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;

use crate::config::Config;
use crate::entity::bonus::Bonus;
use crate::entity::bullet::Bullet;
use crate::entity::enemy::Enemy;
use crate::entity::item::{Inventory, WeaponKind};
use crate::entity::player::Player;
use crate::entity::shop::Shop;
use crate::entity::wall::Wall;
use crate::entity::Visible;
use crate::geometry::Vector2;
use crate::ids::{BonusId, BulletId, EnemyId, PlayerId, ShopId, WallId};
use crate::state::SessionState;

/// Added/updated/removed sets for one entity kind, keyed by stringified id
/// (the wire boundary is JSON-object-shaped; every id type already has a
/// `Display` impl).
#[derive(Debug, Clone, Serialize)]
pub struct EntityDiff<Added, Updated = Added> {
    pub added: HashMap<String, Added>,
    pub updated: HashMap<String, Updated>,
    pub removed: Vec<String>,
}

impl<Added, Updated> Default for EntityDiff<Added, Updated> {
    fn default() -> Self {
        Self {
            added: HashMap::new(),
            updated: HashMap::new(),
            removed: Vec::new(),
        }
    }
}

impl<Added, Updated> EntityDiff<Added, Updated> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallView {
    pub position: Vector2,
    pub width: f64,
    pub height: f64,
    pub orientation: crate::entity::wall::Orientation,
}

impl From<&Wall> for WallView {
    fn from(w: &Wall) -> Self {
        Self {
            position: w.position,
            width: w.width,
            height: w.height,
            orientation: w.orientation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub position: Vector2,
    pub rotation: f64,
    pub kind: crate::entity::enemy::EnemyKind,
    pub lives: f64,
    pub is_alive: bool,
}

impl From<&Enemy> for EnemyView {
    fn from(e: &Enemy) -> Self {
        Self {
            position: e.position,
            rotation: e.rotation,
            kind: e.kind,
            lives: e.lives,
            is_alive: e.is_alive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulletView {
    pub position: Vector2,
    pub velocity: Vector2,
    pub weapon_kind: WeaponKind,
    pub is_active: bool,
}

impl From<&Bullet> for BulletView {
    fn from(b: &Bullet) -> Self {
        Self {
            position: b.position,
            velocity: b.velocity,
            weapon_kind: b.weapon_kind,
            is_active: b.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonusView {
    pub position: Vector2,
    pub kind: crate::entity::bonus::BonusKind,
}

impl From<&Bonus> for BonusView {
    fn from(b: &Bonus) -> Self {
        Self {
            position: b.position,
            kind: b.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopView {
    pub position: Vector2,
    pub name: String,
    pub inventory: HashMap<crate::entity::item::ItemKind, crate::entity::shop::ShopListing>,
}

impl From<&Shop> for ShopView {
    fn from(s: &Shop) -> Self {
        Self {
            position: s.position,
            name: s.name.clone(),
            inventory: s.inventory.clone(),
        }
    }
}

/// Fields visible to every viewer for any connected player (`spec.md` §4.6
/// step 2: "other players' entries include only position/rotation/lives/
/// isAlive/timers").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPublicFields {
    pub position: Vector2,
    pub rotation: f64,
    pub lives: f64,
    pub is_alive: bool,
    pub invulnerable_timer: f64,
    pub night_vision_timer: f64,
}

impl From<&Player> for PlayerPublicFields {
    fn from(p: &Player) -> Self {
        Self {
            position: p.position,
            rotation: p.rotation,
            lives: p.lives,
            is_alive: p.is_alive,
            invulnerable_timer: p.invulnerable_timer,
            night_vision_timer: p.night_vision_timer,
        }
    }
}

/// Fields only the viewer's own player entry carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPrivateFields {
    pub score: i64,
    pub money: i64,
    pub kills: u32,
    pub bullets_left_by_weapon: HashMap<WeaponKind, u32>,
    pub inventory: Inventory,
    pub selected_weapon: WeaponKind,
}

impl From<&Player> for PlayerPrivateFields {
    fn from(p: &Player) -> Self {
        Self {
            score: p.score,
            money: p.money,
            kills: p.kills,
            bullets_left_by_weapon: p.bullets_left_by_weapon.clone(),
            inventory: p.inventory.clone(),
            selected_weapon: p.selected_weapon,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshotEntry {
    pub public: PlayerPublicFields,
    /// `Some` only for the viewer's own entry.
    pub private: Option<PlayerPrivateFields>,
}

/// Updated-entry patch: each field group is present only when it changed
/// since the previous snapshot (`spec.md` §4.6 step 2).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerUpdate {
    pub public: Option<PlayerPublicFields>,
    pub private: Option<PlayerPrivateFields>,
}

impl PlayerUpdate {
    fn is_empty(&self) -> bool {
        self.public.is_none() && self.private.is_none()
    }
}

#[derive(Debug, Clone, Default)]
struct PlayerRecord {
    public: PlayerPublicFields,
    private: Option<PlayerPrivateFields>,
}

/// What a viewer saw last time their delta was built. Kept outside the
/// session's main lock (`SPEC_FULL.md` §5) since it's per-viewer, not
/// shared session state.
#[derive(Debug, Clone, Default)]
pub struct ViewerSnapshot {
    players: HashMap<PlayerId, PlayerRecord>,
    bullets: HashMap<BulletId, BulletView>,
    walls: HashMap<WallId, WallView>,
    enemies: HashMap<EnemyId, EnemyView>,
    bonuses: HashMap<BonusId, BonusView>,
    shops: HashMap<ShopId, ShopView>,
    other_player_positions: HashMap<PlayerId, (Vector2, f64)>,
    shop_occupancy: HashSet<ShopId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameStateDelta {
    pub players: EntityDiff<PlayerSnapshotEntry, PlayerUpdate>,
    pub bullets: EntityDiff<BulletView>,
    pub walls: EntityDiff<WallView>,
    pub enemies: EntityDiff<EnemyView>,
    pub bonuses: EntityDiff<BonusView>,
    pub shops: EntityDiff<ShopView>,
    pub updated_other_player_positions: HashMap<String, (Vector2, f64)>,
    pub removed_other_player_positions: Vec<String>,
    pub entered_shops: Vec<String>,
    pub left_shops: Vec<String>,
    pub timestamp_ms: u64,
}

impl GameStateDelta {
    fn new(timestamp_ms: u64) -> Self {
        Self {
            players: EntityDiff::default(),
            bullets: EntityDiff::default(),
            walls: EntityDiff::default(),
            enemies: EntityDiff::default(),
            bonuses: EntityDiff::default(),
            shops: EntityDiff::default(),
            updated_other_player_positions: HashMap::new(),
            removed_other_player_positions: Vec::new(),
            entered_shops: Vec::new(),
            left_shops: Vec::new(),
            timestamp_ms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
            && self.bullets.is_empty()
            && self.walls.is_empty()
            && self.enemies.is_empty()
            && self.bonuses.is_empty()
            && self.shops.is_empty()
            && self.updated_other_player_positions.is_empty()
            && self.removed_other_player_positions.is_empty()
            && self.entered_shops.is_empty()
            && self.left_shops.is_empty()
    }
}

/// `entity` is visible to `viewer` directly, or (absent night vision) via
/// any relay player that can see it (`spec.md` §4.5's two-level fan).
fn is_visible_any(entity: &impl Visible, viewer: &Player, relay: &[&Player], night_vision: bool, config: &Config) -> bool {
    if entity.is_visible_to(viewer, config) {
        return true;
    }
    if night_vision {
        return false;
    }
    relay.iter().any(|r| entity.is_visible_to(r, config))
}

fn diff_map<K, V>(cur: &HashMap<K, V>, prev: &HashMap<K, V>, out: &mut EntityDiff<V>)
where
    K: Eq + Hash + std::fmt::Display,
    V: Clone + PartialEq,
{
    for (id, v) in cur {
        match prev.get(id) {
            None => {
                out.added.insert(id.to_string(), v.clone());
            }
            Some(pv) if pv != v => {
                out.updated.insert(id.to_string(), v.clone());
            }
            _ => {}
        }
    }
    for id in prev.keys() {
        if !cur.contains_key(id) {
            out.removed.push(id.to_string());
        }
    }
}

/// Builds (and atomically swaps in) the delta for `viewer_id`, or `None` if
/// the viewer isn't connected or nothing visible changed (`spec.md` §4.6:
/// "callers suppress empty deltas").
pub fn build_delta(
    state: &SessionState,
    config: &Config,
    viewer_id: &PlayerId,
    snapshots: &mut HashMap<PlayerId, ViewerSnapshot>,
    now_ms: u64,
) -> Option<GameStateDelta> {
    let viewer = state.players.get(viewer_id)?;
    if !viewer.is_connected {
        return None;
    }

    let night_vision = viewer.night_vision_timer > 0.0;
    let relay: Vec<&Player> = state
        .players
        .values()
        .filter(|p| p.id != *viewer_id && p.is_connected && p.is_visible_to(viewer, config))
        .collect();

    let mut cur_walls: HashMap<WallId, WallView> = HashMap::new();
    for w in state.all_walls() {
        if is_visible_any(w, viewer, &relay, night_vision, config) {
            cur_walls.insert(w.id, WallView::from(w));
        }
    }

    let mut cur_enemies: HashMap<EnemyId, EnemyView> = HashMap::new();
    for e in state.all_enemies() {
        if e.is_alive && is_visible_any(e, viewer, &relay, night_vision, config) {
            cur_enemies.insert(e.id, EnemyView::from(e));
        }
    }
    // The viewer additionally learns of walls their visible enemies patrol
    // along, even if those walls aren't independently in sight (`spec.md`
    // §4.5, last sentence).
    for e in state.all_enemies() {
        if !cur_enemies.contains_key(&e.id) {
            continue;
        }
        if let Some(wall_id) = e.wall_id {
            if !cur_walls.contains_key(&wall_id) {
                if let Some(w) = state.resolve_wall_anywhere(wall_id) {
                    cur_walls.insert(wall_id, WallView::from(w));
                }
            }
        }
    }

    let mut cur_bullets: HashMap<BulletId, BulletView> = HashMap::new();
    for b in state.bullets.values() {
        if is_visible_any(b, viewer, &relay, night_vision, config) {
            cur_bullets.insert(b.id, BulletView::from(b));
        }
    }

    let mut cur_bonuses: HashMap<BonusId, BonusView> = HashMap::new();
    for b in state.bonuses.values() {
        if is_visible_any(b, viewer, &relay, night_vision, config) {
            cur_bonuses.insert(b.id, BonusView::from(b));
        }
    }

    let mut cur_shops: HashMap<ShopId, ShopView> = HashMap::new();
    for s in state.all_shops() {
        if is_visible_any(s, viewer, &relay, night_vision, config) {
            cur_shops.insert(s.id, ShopView::from(s));
        }
    }

    // Other players go through the same visible-directly-or-via-any-relay
    // fan as every other entity kind (`spec.md` §4.6 step 2), not just the
    // viewer's own first-order relay set.
    let mut cur_players: HashMap<PlayerId, PlayerRecord> = HashMap::new();
    cur_players.insert(
        viewer_id.clone(),
        PlayerRecord {
            public: PlayerPublicFields::from(viewer),
            private: Some(PlayerPrivateFields::from(viewer)),
        },
    );
    for p in state.players.values() {
        if p.id == *viewer_id || !p.is_connected {
            continue;
        }
        if is_visible_any(p, viewer, &relay, night_vision, config) {
            cur_players.insert(
                p.id.clone(),
                PlayerRecord {
                    public: PlayerPublicFields::from(p),
                    private: None,
                },
            );
        }
    }

    let cur_other_positions: HashMap<PlayerId, (Vector2, f64)> = cur_players
        .iter()
        .filter(|(pid, _)| **pid != *viewer_id)
        .map(|(pid, rec)| (pid.clone(), (rec.public.position, rec.public.rotation)))
        .collect();

    let cur_shop_occupancy: HashSet<ShopId> = state
        .all_shops()
        .filter(|s| cur_shops.contains_key(&s.id) && viewer.position.distance_to(s.position) <= config.shop_size / 2.0)
        .map(|s| s.id)
        .collect();

    let prev = snapshots.entry(viewer_id.clone()).or_default();

    let mut delta = GameStateDelta::new(now_ms);

    diff_players(&cur_players, &prev.players, &mut delta.players);
    diff_map(&cur_walls, &prev.walls, &mut delta.walls);
    diff_map(&cur_enemies, &prev.enemies, &mut delta.enemies);
    diff_map(&cur_bullets, &prev.bullets, &mut delta.bullets);
    diff_map(&cur_bonuses, &prev.bonuses, &mut delta.bonuses);
    diff_map(&cur_shops, &prev.shops, &mut delta.shops);

    for (pid, pos) in &cur_other_positions {
        if prev.other_player_positions.get(pid) != Some(pos) {
            delta.updated_other_player_positions.insert(pid.to_string(), *pos);
        }
    }
    for pid in prev.other_player_positions.keys() {
        if !cur_other_positions.contains_key(pid) {
            delta.removed_other_player_positions.push(pid.to_string());
        }
    }

    for sid in &cur_shop_occupancy {
        if !prev.shop_occupancy.contains(sid) {
            delta.entered_shops.push(sid.to_string());
        }
    }
    for sid in &prev.shop_occupancy {
        if !cur_shop_occupancy.contains(sid) {
            delta.left_shops.push(sid.to_string());
        }
    }

    *prev = ViewerSnapshot {
        players: cur_players,
        bullets: cur_bullets,
        walls: cur_walls,
        enemies: cur_enemies,
        bonuses: cur_bonuses,
        shops: cur_shops,
        other_player_positions: cur_other_positions,
        shop_occupancy: cur_shop_occupancy,
    };

    if delta.is_empty() {
        None
    } else {
        Some(delta)
    }
}

fn diff_players(
    cur: &HashMap<PlayerId, PlayerRecord>,
    prev: &HashMap<PlayerId, PlayerRecord>,
    out: &mut EntityDiff<PlayerSnapshotEntry, PlayerUpdate>,
) {
    for (id, v) in cur {
        match prev.get(id) {
            None => {
                out.added.insert(
                    id.to_string(),
                    PlayerSnapshotEntry {
                        public: v.public.clone(),
                        private: v.private.clone(),
                    },
                );
            }
            Some(pv) => {
                let mut patch = PlayerUpdate::default();
                if pv.public != v.public {
                    patch.public = Some(v.public.clone());
                }
                if pv.private != v.private {
                    patch.private = v.private.clone();
                }
                if !patch.is_empty() {
                    out.updated.insert(id.to_string(), patch);
                }
            }
        }
    }
    for id in prev.keys() {
        if !cur.contains_key(id) {
            out.removed.push(id.to_string());
        }
    }
}
