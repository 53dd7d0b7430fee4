//! One game session (`spec.md` §4.7, §5): owns its state behind a
//! single-writer/many-reader lock, plus the per-viewer snapshots used by
//! the delta builder.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::clock::Clock;
use crate::config::Config;
use crate::delta::{self, GameStateDelta, ViewerSnapshot};
use crate::entity::player::Player;
use crate::error::SimError;
use crate::geometry::Vector2;
use crate::ids::{PlayerId, SessionId};
use crate::input::InputMessage;
use crate::sim::{self, spawn};
use crate::state::SessionState;
use crate::store::{self, SessionRecord, SessionStore};

pub struct Session {
    pub id: SessionId,
    config: Arc<Config>,
    clock: Arc<dyn Clock>,
    state: RwLock<SessionState>,
    /// Kept outside the state lock (`SPEC_FULL.md` §5): two readers diffing
    /// different viewers shouldn't serialize on each other's snapshot swap.
    snapshots: Mutex<HashMap<PlayerId, ViewerSnapshot>>,
    last_tick_at: Mutex<Option<f64>>,
}

impl Session {
    pub fn new(id: SessionId, world_seed: u64, config: Arc<Config>, clock: Arc<dyn Clock>) -> Self {
        Self::from_state(id, SessionState::new(world_seed), config, clock)
    }

    pub fn from_state(id: SessionId, state: SessionState, config: Arc<Config>, clock: Arc<dyn Clock>) -> Self {
        Self {
            id,
            config,
            clock,
            state: RwLock::new(state),
            snapshots: Mutex::new(HashMap::new()),
            last_tick_at: Mutex::new(None),
        }
    }

    /// Hydrates a session from the durable store, or `None` if no record
    /// exists for `id` (`spec.md` §4.7 `loadFrom`).
    pub fn load_from(store: &dyn SessionStore, id: SessionId, config: Arc<Config>, clock: Arc<dyn Clock>) -> anyhow::Result<Option<Session>> {
        match store.find_by_id(&id)? {
            Some(record) => {
                let state = store::state_from_record(&record, &config);
                Ok(Some(Session::from_state(id, state, config, clock)))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, display_name))]
    pub async fn connect_player(&self, id: PlayerId, display_name: String) {
        let mut state = self.state.write().await;
        let previously_alive = state.players.get(&id).map(|p| p.is_alive);

        match previously_alive {
            None => {
                let mut rng = state.tick_rng();
                let spawn_position = spawn::pick_spawn_point(&state, &self.config, &mut rng, Vector2::ZERO);
                let player = Player::new(id.clone(), display_name, spawn_position, &self.config);
                state.players.insert(id.clone(), player);
                tracing::info!(player = %id, "player connected");
            }
            Some(is_alive) => {
                if let Some(p) = state.players.get_mut(&id) {
                    p.is_connected = true;
                    p.display_name = display_name;
                }
                if !is_alive {
                    state.respawn_queue.insert(id.clone());
                    tracing::info!(player = %id, "player reconnected, respawn enqueued");
                } else {
                    tracing::info!(player = %id, "player reconnected");
                }
            }
        }
        drop(state);
        self.snapshots.lock().await.insert(id, ViewerSnapshot::default());
    }

    #[tracing::instrument(skip(self))]
    pub async fn disconnect_player(&self, id: &PlayerId) {
        let mut state = self.state.write().await;
        if let Some(p) = state.players.get_mut(id) {
            p.is_connected = false;
        }
        state.pending_inputs.remove(id);
        state.last_raw_input.remove(id);
        state.pending_item_uses.remove(id);
        state.pending_purchases.remove(id);
        drop(state);
        self.snapshots.lock().await.remove(id);
        tracing::info!(player = %id, "player disconnected");
    }

    /// Coalesces `input` into the session's pending state (`spec.md` §4.7):
    /// edge-triggered item/purchase key releases accumulate, everything
    /// else is replaced by the latest value.
    pub async fn update_input(&self, id: &PlayerId, input: InputMessage) -> Result<(), SimError> {
        let mut state = self.state.write().await;
        if !state.players.get(id).map(|p| p.is_connected).unwrap_or(false) {
            return Err(SimError::InputIgnored(id.to_string()));
        }

        let old = state.last_raw_input.get(id).cloned().unwrap_or_default();
        let mut item_uses = Vec::new();
        let mut purchases = Vec::new();
        crate::input::accumulate_edge_triggers(&old, &input, &mut item_uses, &mut purchases);
        state.pending_item_uses.entry(id.clone()).or_default().extend(item_uses);
        state.pending_purchases.entry(id.clone()).or_default().extend(purchases);
        state.last_raw_input.insert(id.clone(), input.clone());
        state.pending_inputs.insert(id.clone(), input);
        Ok(())
    }

    /// Enqueues a respawn for `id` on the next tick (`spec.md` §4.7
    /// `respawn`).
    pub async fn respawn(&self, id: &PlayerId) {
        self.state.write().await.respawn_queue.insert(id.clone());
    }

    /// Runs one tick (`spec.md` §4.4), deriving `dt` from the injected
    /// clock rather than the target period, capped at `Config::max_dt`
    /// (`spec.md` §9, "Time handling").
    #[tracing::instrument(skip(self))]
    pub async fn tick(&self) {
        let now = self.clock.now_secs();
        let dt = {
            let mut last = self.last_tick_at.lock().await;
            let dt = match *last {
                Some(prev) => (now - prev).max(0.0).min(self.config.max_dt),
                None => self.config.game_loop_interval,
            };
            *last = Some(now);
            dt
        };

        let mut state = self.state.write().await;
        sim::tick(&mut state, &self.config, dt, now);
    }

    /// Builds `viewer_id`'s delta (`spec.md` §4.6), or `None` if nothing
    /// visible changed — callers are expected to suppress that case.
    #[tracing::instrument(skip(self))]
    pub async fn build_delta(&self, viewer_id: &PlayerId) -> Option<GameStateDelta> {
        let now_ms = (self.clock.now_secs() * 1000.0).round() as u64;
        let state = self.state.read().await;
        let mut snapshots = self.snapshots.lock().await;
        delta::build_delta(&state, &self.config, viewer_id, &mut snapshots, now_ms)
    }

    /// Snapshots session state into the store (`spec.md` §4.7 `saveTo`).
    pub async fn save_to(&self, store: &dyn SessionStore) -> anyhow::Result<()> {
        let state = self.state.read().await;
        let record: SessionRecord = store::record_from_state(&self.id, &state);
        store.upsert(&record)
    }

    /// Stops being ticked (the caller simply stops invoking `tick`), saves
    /// once, then releases (`spec.md` §5, "On session shutdown").
    pub async fn shutdown(&self, store: &dyn SessionStore) -> anyhow::Result<()> {
        self.save_to(store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteSessionStore;

    struct FixedClock(std::sync::Mutex<f64>);

    impl FixedClock {
        fn new(start: f64) -> Self {
            Self(std::sync::Mutex::new(start))
        }
        fn advance(&self, dt: f64) {
            *self.0.lock().unwrap() += dt;
        }
    }

    impl Clock for FixedClock {
        fn now_secs(&self) -> f64 {
            *self.0.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn connect_tick_delta_and_resume_round_trip() {
        let config = Arc::new(Config::default());
        let fixed_clock = Arc::new(FixedClock::new(100.0));
        let clock: Arc<dyn Clock> = fixed_clock.clone();
        let store = SqliteSessionStore::open(":memory:").unwrap();

        let session = Session::new(SessionId("s1".to_string()), 42, config.clone(), clock.clone());
        let pid = PlayerId("alice".to_string());
        session.connect_player(pid.clone(), "Alice".to_string()).await;

        session.update_input(&pid, InputMessage { forward: true, ..Default::default() }).await.unwrap();
        fixed_clock.advance(1.0 / 30.0);
        session.tick().await;

        let delta = session.build_delta(&pid).await.expect("first delta must not be empty");
        assert!(delta.players.added.contains_key(&pid.to_string()));

        session.save_to(&store).await.unwrap();
        let reloaded = Session::load_from(&store, SessionId("s1".to_string()), config, clock)
            .unwrap()
            .expect("a just-saved session must resume");
        assert!(reloaded.state.read().await.players.contains_key(&pid));

        session.disconnect_player(&pid).await;
        assert!(!session.state.read().await.players[&pid].is_connected);
    }
}
