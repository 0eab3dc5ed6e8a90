use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use venue::model::Room;
use venue::server::{
    MemorySessions, MemoryStore, NoRelay, PresenceSweeper, VenueConfig, VenueState, router,
};

#[derive(Parser)]
#[command(name = "venue-server", about = "Signaling server for live venue rooms")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file.
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => VenueConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => VenueConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }

    let store = Arc::new(MemoryStore::new());
    let sessions = Arc::new(MemorySessions::new());
    for session in &config.sessions {
        sessions.open(session.token.clone(), session.context());
    }
    info!("Registered {} static sessions", config.sessions.len());

    let state = VenueState::build(store.clone(), sessions.clone(), &config);
    for room in &config.rooms {
        state
            .service
            .open_room(Room::from(room))
            .await
            .with_context(|| format!("opening room {}", room.id))?;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = Arc::new(PresenceSweeper::new(
        store,
        state.service.registry().clone(),
        sessions,
        Arc::new(NoRelay),
    ));
    let sweep_task = sweeper.spawn(config.sweep_interval(), shutdown_rx);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!("Venue signaling listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("serving HTTP")?;

    let _ = shutdown_tx.send(true);
    sweep_task.await.context("joining presence sweeper")?;
    Ok(())
}
