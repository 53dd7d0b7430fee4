//! Owns every live session in the process (`spec.md` §1, "many independent
//! game sessions run concurrently in one process") and drives each one's
//! tick loop on its own `tokio::time::interval` task.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::config::Config;
use crate::ids::SessionId;
use crate::session::Session;
use crate::store::SessionStore;

struct Handle {
    session: Arc<Session>,
    ticker: JoinHandle<()>,
}

pub struct Orchestrator {
    config: Arc<Config>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn SessionStore>,
    sessions: RwLock<HashMap<SessionId, Handle>>,
}

impl Orchestrator {
    pub fn new(config: Arc<Config>, clock: Arc<dyn Clock>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            config,
            clock,
            store,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a fresh session, or resumes one from the store if `id`
    /// already has a saved record, and starts its tick task.
    #[tracing::instrument(skip(self))]
    pub async fn start_session(&self, id: SessionId, world_seed: u64) -> anyhow::Result<Arc<Session>> {
        if let Some(existing) = self.sessions.read().await.get(&id) {
            return Ok(existing.session.clone());
        }

        let session = match Session::load_from(self.store.as_ref(), id.clone(), self.config.clone(), self.clock.clone())? {
            Some(session) => {
                tracing::info!(session = %id, "resumed session from store");
                Arc::new(session)
            }
            None => {
                tracing::info!(session = %id, world_seed, "created new session");
                Arc::new(Session::new(id.clone(), world_seed, self.config.clone(), self.clock.clone()))
            }
        };

        let ticker = self.spawn_ticker(session.clone());
        self.sessions.write().await.insert(id, Handle { session: session.clone(), ticker });
        Ok(session)
    }

    fn spawn_ticker(&self, session: Arc<Session>) -> JoinHandle<()> {
        let period = std::time::Duration::from_secs_f64(self.config.game_loop_interval);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                session.tick().await;
            }
        })
    }

    pub async fn session(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).map(|h| h.session.clone())
    }

    /// Stops ticking `id`, saves it once, and drops it from the registry
    /// (`SPEC_FULL.md` §4.7, "graceful drain").
    #[tracing::instrument(skip(self))]
    pub async fn stop_session(&self, id: &SessionId) -> anyhow::Result<()> {
        let Some(handle) = self.sessions.write().await.remove(id) else {
            return Ok(());
        };
        handle.ticker.abort();
        handle.session.shutdown(self.store.as_ref()).await?;
        tracing::info!(session = %id, "session drained and saved");
        Ok(())
    }

    /// Drains every live session, e.g. on process shutdown.
    pub async fn shutdown_all(&self) {
        let ids: Vec<SessionId> = self.sessions.read().await.keys().cloned().collect();
        for id in ids {
            if let Err(err) = self.stop_session(&id).await {
                tracing::warn!(session = %id, error = %err, "failed to save session during shutdown");
            }
        }
    }
}
