use std::sync::Arc;

use arena_server::clock::shared_system_clock;
use arena_server::config::Config;
use arena_server::ids::SessionId;
use arena_server::orchestrator::Orchestrator;
use arena_server::store::{SessionStore, SqliteSessionStore};

/// Binds the core engine together for standalone running. Wire framing and
/// auth are out of scope (`spec.md` §1), so this binary only proves the
/// orchestrator/session/store plumbing starts, ticks, and drains cleanly —
/// a real deployment drives `Orchestrator` from its own transport listener.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Arc::new(Config::default());
    let clock = shared_system_clock();
    let store: Arc<dyn SessionStore> = Arc::new(SqliteSessionStore::open("sessions.sqlite3")?);

    let orchestrator = Arc::new(Orchestrator::new(config, clock, store));

    let default_session = SessionId("default".to_string());
    orchestrator.start_session(default_session, 0).await?;
    tracing::info!("arena-server started, sessions ticking in the background");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested, draining sessions");
    orchestrator.shutdown_all().await;
    Ok(())
}
