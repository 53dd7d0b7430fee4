//! The durable session store collaborator (`spec.md` §6, §4.7 `saveTo`/
//! `loadFrom`). `SqliteSessionStore` is grounded on the teacher's
//! `database.rs` (`rusqlite`, WAL mode, a blob storage table), but reports
//! failures through `anyhow::Result` instead of `unwrap`-ing: `spec.md` §7
//! treats a store fault as recoverable (`StoreUnavailable`), not fatal.

use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use crate::entity::bonus::{Bonus, BonusKind};
use crate::entity::enemy::{Enemy, EnemyKind};
use crate::entity::item::{Inventory, ItemKind, WeaponKind};
use crate::entity::shop::{Shop, ShopListing};
use crate::entity::wall::{Orientation, Wall};
use crate::geometry::{ChunkKey, Vector2};
use crate::ids::{BonusId, EnemyId, PlayerId, SessionId, ShopId, WallId};
use crate::state::SessionState;

/// One persisted world object (`spec.md` §6: "a flat set of world objects
/// with `{id, kind, x, y, properties}`"). Bullets are deliberately not part
/// of this set — they're transient, sub-second entities; resuming a saved
/// session with no in-flight bullets is an acceptable simplification (see
/// DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorldObjectRecord {
    Wall {
        id: u64,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        orientation: Orientation,
    },
    Enemy {
        id: u64,
        x: f64,
        y: f64,
        rotation: f64,
        kind: EnemyKind,
        wall_id: Option<u64>,
        direction: i32,
        lives: f64,
        shoot_delay: f64,
        is_alive: bool,
        dead_timer: f64,
    },
    Bonus {
        id: u64,
        x: f64,
        y: f64,
        kind: BonusKind,
        dropped_by: Option<String>,
        dropped_at: Option<f64>,
        inventory: Option<Inventory>,
    },
    Shop {
        id: u64,
        x: f64,
        y: f64,
        name: String,
        inventory: HashMap<ItemKind, ShopListing>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    pub display_name: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub lives: f64,
    pub score: i64,
    pub money: i64,
    pub kills: u32,
    pub is_alive: bool,
    pub bullets_left_by_weapon: HashMap<WeaponKind, u32>,
    pub invulnerable_timer: f64,
    pub night_vision_timer: f64,
    pub inventory: Inventory,
    pub selected_weapon: WeaponKind,
}

/// Top-level save/load unit (`spec.md` §6). A version tag lets
/// `loadFrom` detect pre-versioned data and re-run shop inventory
/// generation rather than trust stale rolls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub schema_version: u32,
    pub session_id: String,
    pub world_seed: u64,
    pub objects: Vec<WorldObjectRecord>,
    pub generated_chunks: Vec<(i64, i64)>,
    pub players: Vec<PlayerRecord>,
}

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

pub trait SessionStore: Send + Sync {
    fn find_by_id(&self, id: &SessionId) -> Result<Option<SessionRecord>>;
    fn upsert(&self, record: &SessionRecord) -> Result<()>;
}

/// Builds the save record from live session state (`spec.md` §4.7
/// `saveTo`). Disconnected players are saved too — only a live connection is
/// transient, not a player's progress.
pub fn record_from_state(session_id: &SessionId, state: &SessionState) -> SessionRecord {
    let mut objects = Vec::new();

    for w in state.all_walls() {
        objects.push(WorldObjectRecord::Wall {
            id: w.id.0,
            x: w.position.x,
            y: w.position.y,
            width: w.width,
            height: w.height,
            orientation: w.orientation,
        });
    }
    for e in state.all_enemies() {
        objects.push(WorldObjectRecord::Enemy {
            id: e.id.0,
            x: e.position.x,
            y: e.position.y,
            rotation: e.rotation,
            kind: e.kind,
            wall_id: e.wall_id.map(|w| w.0),
            direction: e.direction,
            lives: e.lives,
            shoot_delay: e.shoot_delay,
            is_alive: e.is_alive,
            dead_timer: e.dead_timer,
        });
    }
    for s in state.all_shops() {
        objects.push(WorldObjectRecord::Shop {
            id: s.id.0,
            x: s.position.x,
            y: s.position.y,
            name: s.name.clone(),
            inventory: s.inventory.clone(),
        });
    }
    for b in state.bonuses.values() {
        objects.push(WorldObjectRecord::Bonus {
            id: b.id.0,
            x: b.position.x,
            y: b.position.y,
            kind: b.kind,
            dropped_by: b.dropped_by.as_ref().map(|p| p.0.clone()),
            dropped_at: b.dropped_at,
            inventory: b.inventory.clone(),
        });
    }

    let players = state
        .players
        .values()
        .map(|p| PlayerRecord {
            id: p.id.0.clone(),
            display_name: p.display_name.clone(),
            x: p.position.x,
            y: p.position.y,
            rotation: p.rotation,
            lives: p.lives,
            score: p.score,
            money: p.money,
            kills: p.kills,
            is_alive: p.is_alive,
            bullets_left_by_weapon: p.bullets_left_by_weapon.clone(),
            invulnerable_timer: p.invulnerable_timer,
            night_vision_timer: p.night_vision_timer,
            inventory: p.inventory.clone(),
            selected_weapon: p.selected_weapon,
        })
        .collect();

    SessionRecord {
        schema_version: CURRENT_SCHEMA_VERSION,
        session_id: session_id.0.clone(),
        world_seed: state.world_seed,
        objects,
        generated_chunks: state.generated_chunks.iter().map(|c| (c.cx, c.cy)).collect(),
        players,
    }
}

/// Hydrates a fresh `SessionState` from a record (`spec.md` §4.7
/// `loadFrom`). Shop inventory generation is re-run rather than trusted
/// when `schema_version` predates `CURRENT_SCHEMA_VERSION`.
pub fn state_from_record(record: &SessionRecord, config: &crate::config::Config) -> SessionState {
    let mut state = SessionState::new(record.world_seed);
    let regenerate_shops = record.schema_version < CURRENT_SCHEMA_VERSION;

    for (cx, cy) in &record.generated_chunks {
        state.generated_chunks.insert(ChunkKey::new(*cx, *cy));
    }

    for obj in &record.objects {
        match obj {
            WorldObjectRecord::Wall { id, x, y, width, height, orientation } => {
                let position = Vector2::new(*x, *y);
                let chunk = crate::geometry::chunk_of(position.x, position.y, config.chunk_size);
                let wall = Wall::new(WallId(*id), position, *width, *height, *orientation);
                state.walls_by_chunk.entry(chunk).or_default().insert(wall.id, wall);
            }
            WorldObjectRecord::Enemy {
                id,
                x,
                y,
                rotation,
                kind,
                wall_id,
                direction,
                lives,
                shoot_delay,
                is_alive,
                dead_timer,
            } => {
                let position = Vector2::new(*x, *y);
                let chunk = crate::geometry::chunk_of(position.x, position.y, config.chunk_size);
                let enemy = Enemy {
                    id: EnemyId(*id),
                    position,
                    rotation: *rotation,
                    kind: *kind,
                    wall_id: wall_id.map(WallId),
                    direction: *direction,
                    lives: *lives,
                    shoot_delay: *shoot_delay,
                    is_alive: *is_alive,
                    dead_timer: *dead_timer,
                };
                state.enemies_by_chunk.entry(chunk).or_default().insert(enemy.id, enemy);
            }
            WorldObjectRecord::Shop { id, x, y, name, inventory } => {
                let position = Vector2::new(*x, *y);
                let chunk = crate::geometry::chunk_of(position.x, position.y, config.chunk_size);
                let inventory = if regenerate_shops {
                    HashMap::new()
                } else {
                    inventory.clone()
                };
                let shop = Shop {
                    id: ShopId(*id),
                    position,
                    name: name.clone(),
                    inventory,
                };
                state.shops_by_chunk.entry(chunk).or_default().insert(shop.id, shop);
            }
            WorldObjectRecord::Bonus { id, x, y, kind, dropped_by, dropped_at, inventory } => {
                let bonus = Bonus {
                    id: BonusId(*id),
                    position: Vector2::new(*x, *y),
                    kind: *kind,
                    dropped_by: dropped_by.clone().map(PlayerId),
                    dropped_at: *dropped_at,
                    picked_up_by: None,
                    picked_up_at: None,
                    inventory: inventory.clone(),
                };
                state.bonuses.insert(bonus.id, bonus);
            }
        }
    }

    for rec in &record.players {
        let player = crate::entity::player::Player {
            id: PlayerId(rec.id.clone()),
            display_name: rec.display_name.clone(),
            position: Vector2::new(rec.x, rec.y),
            rotation: rec.rotation,
            lives: rec.lives,
            score: rec.score,
            money: rec.money,
            kills: rec.kills,
            is_alive: rec.is_alive,
            is_connected: false,
            bullets_left_by_weapon: rec.bullets_left_by_weapon.clone(),
            recharge_accumulator: 0.0,
            invulnerable_timer: rec.invulnerable_timer,
            night_vision_timer: rec.night_vision_timer,
            inventory: rec.inventory.clone(),
            selected_weapon: rec.selected_weapon,
            last_shot_at: f64::NEG_INFINITY,
        };
        state.players.insert(player.id.clone(), player);
    }

    let max_id = record
        .objects
        .iter()
        .map(|o| match o {
            WorldObjectRecord::Wall { id, .. }
            | WorldObjectRecord::Enemy { id, .. }
            | WorldObjectRecord::Shop { id, .. }
            | WorldObjectRecord::Bonus { id, .. } => *id,
        })
        .max()
        .unwrap_or(0);
    for _ in 0..=max_id {
        state.id_alloc.next();
    }

    state
}

/// `rusqlite`-backed store, one `sessions` table keyed by session id storing
/// a `bincode`-serialized `SessionRecord` blob, mirroring the teacher's
/// `players (name TEXT PRIMARY KEY, save BLOB NOT NULL)` table.
pub struct SqliteSessionStore {
    conn: std::sync::Mutex<rusqlite::Connection>,
}

impl SqliteSessionStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = rusqlite::Connection::open(path).context("opening session store database")?;
        conn.pragma_update(None, "journal_mode", "wal")
            .context("enabling WAL journal mode")?;
        conn.execute(
            "create table if not exists sessions (
                id TEXT PRIMARY KEY,
                record BLOB NOT NULL
            )",
            [],
        )
        .context("creating sessions table")?;
        Ok(Self {
            conn: std::sync::Mutex::new(conn),
        })
    }
}

impl SessionStore for SqliteSessionStore {
    fn find_by_id(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let conn = self.conn.lock().expect("session store connection poisoned");
        let mut stmt = conn
            .prepare("SELECT record FROM sessions WHERE id = ?")
            .context("preparing find_by_id query")?;
        let bytes: Option<Vec<u8>> = stmt
            .query_row([&id.0], |row| row.get(0))
            .optional()
            .context("querying session record")?;
        match bytes {
            Some(bytes) => {
                let record = bincode::deserialize(&bytes).context("deserializing session record")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn upsert(&self, record: &SessionRecord) -> Result<()> {
        let conn = self.conn.lock().expect("session store connection poisoned");
        let bytes = bincode::serialize(record).context("serializing session record")?;
        conn.execute(
            "INSERT INTO sessions (id, record) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET record = excluded.record",
            rusqlite::params![record.session_id, bytes],
        )
        .context("upserting session record")?;
        Ok(())
    }
}
