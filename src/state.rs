//! Per-session in-memory store (`spec.md` §3): partitioned by chunk for
//! walls/enemies/shops, flat for bullets/bonuses/players.

use std::collections::{HashMap, HashSet};

use crate::entity::bonus::Bonus;
use crate::entity::bullet::Bullet;
use crate::entity::enemy::Enemy;
use crate::entity::player::Player;
use crate::entity::shop::Shop;
use crate::entity::wall::Wall;
use crate::geometry::ChunkKey;
use crate::ids::{BonusId, BulletId, EnemyId, IdAllocator, PlayerId, ShopId, WallId};
use crate::input::InputMessage;

#[derive(Debug, Default)]
pub struct SessionState {
    pub players: HashMap<PlayerId, Player>,
    pub bullets: HashMap<BulletId, Bullet>,
    pub bonuses: HashMap<BonusId, Bonus>,

    pub walls_by_chunk: HashMap<ChunkKey, HashMap<WallId, Wall>>,
    pub enemies_by_chunk: HashMap<ChunkKey, HashMap<EnemyId, Enemy>>,
    pub shops_by_chunk: HashMap<ChunkKey, HashMap<ShopId, Shop>>,
    pub generated_chunks: HashSet<ChunkKey>,

    pub respawn_queue: HashSet<PlayerId>,
    /// The latest input snapshot per connected player, coalesced by the
    /// orchestrator (`spec.md` §5: "only the latest input is used each
    /// tick").
    pub pending_inputs: HashMap<PlayerId, InputMessage>,
    /// The raw input last seen for a player, kept only so the orchestrator
    /// can detect edge-triggered item/purchase key releases on the next
    /// `update_input` call.
    pub last_raw_input: HashMap<PlayerId, InputMessage>,
    /// Accumulated edge-triggered item-use presses, drained in P1.
    pub pending_item_uses: HashMap<PlayerId, Vec<usize>>,
    /// Accumulated edge-triggered purchase presses, drained in P1.
    pub pending_purchases: HashMap<PlayerId, Vec<usize>>,

    pub id_alloc: IdAllocator,
    pub world_seed: u64,
    /// Incremented once per tick; mixed with `world_seed` to derive a fresh
    /// per-tick RNG stream (`spec.md` §9 rules out a shared mutable RNG).
    pub tick_count: u64,
}

impl SessionState {
    pub fn new(world_seed: u64) -> Self {
        Self {
            world_seed,
            ..Default::default()
        }
    }

    /// The union of every connected player's 3x3 chunk neighborhood,
    /// deduplicated (`spec.md` §4.4 P2: "For every chunk in the union of
    /// players' 3x3 neighborhoods").
    pub fn active_chunk_neighborhood(&self, chunk_size: f64) -> HashSet<ChunkKey> {
        let mut out = HashSet::new();
        for player in self.players.values() {
            if !player.is_connected {
                continue;
            }
            let center = crate::geometry::chunk_of(player.position.x, player.position.y, chunk_size);
            for c in center.neighborhood() {
                out.insert(c);
            }
        }
        out
    }

    pub fn walls_in(&self, chunks: impl IntoIterator<Item = ChunkKey>) -> Vec<&Wall> {
        chunks
            .into_iter()
            .filter_map(|c| self.walls_by_chunk.get(&c))
            .flat_map(|m| m.values())
            .collect()
    }

    pub fn enemies_in(&self, chunks: impl IntoIterator<Item = ChunkKey>) -> Vec<&Enemy> {
        chunks
            .into_iter()
            .filter_map(|c| self.enemies_by_chunk.get(&c))
            .flat_map(|m| m.values())
            .collect()
    }

    pub fn all_walls(&self) -> impl Iterator<Item = &Wall> {
        self.walls_by_chunk.values().flat_map(|m| m.values())
    }

    pub fn all_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies_by_chunk.values().flat_map(|m| m.values())
    }

    pub fn all_shops(&self) -> impl Iterator<Item = &Shop> {
        self.shops_by_chunk.values().flat_map(|m| m.values())
    }

    /// Fallback full-session scan, used only to confirm an enemy's wall
    /// reference is truly unresolvable (data corruption) rather than just
    /// missing from its expected chunk. Enemies are always generated into
    /// the same chunk as their wall (`enemies::run` checks that chunk
    /// inline first), so this only runs after that fast path misses.
    pub fn resolve_wall_anywhere(&self, wall_id: WallId) -> Option<&Wall> {
        self.all_walls().find(|w| w.id == wall_id)
    }

    /// A fresh per-tick RNG stream, advancing `tick_count` as a side effect.
    pub fn tick_rng(&mut self) -> rand::rngs::StdRng {
        use rand::SeedableRng;
        let mixed = self.world_seed ^ self.tick_count.wrapping_mul(0xA24BAED4963EE407);
        self.tick_count += 1;
        rand::rngs::StdRng::seed_from_u64(mixed)
    }
}
