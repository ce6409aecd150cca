//! convoy-daemon entry point.
//!
//! This file is intentionally thin: it loads the layered config, sets up
//! tracing, picks the store backend, and starts the HTTP server. All route
//! handlers live in `routes.rs`; shared state lives in `state.rs`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use convoy_config::{DaemonSettings, StoreBackend};
use convoy_daemon::{routes, state};
use convoy_store::MemStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Dev convenience; production injects env vars directly.
    let _ = dotenvy::dotenv();

    init_tracing();

    // Each CLI argument is one YAML layer, later files winning.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let paths: Vec<&str> = args.iter().map(String::as_str).collect();
    let loaded = convoy_config::load_layered_yaml(&paths)?;

    let mut settings = DaemonSettings::from_config_json(&loaded.config_json)?;
    settings.apply_env_overrides()?;

    let shared = match settings.store {
        StoreBackend::Memory => Arc::new(state::AppState::in_memory(
            Arc::new(MemStore::new()),
            loaded.config_hash.clone(),
        )),
        StoreBackend::Postgres => {
            let pool = convoy_db::connect_from_env().await?;
            convoy_db::migrate(&pool).await?;
            Arc::new(state::AppState::postgres(pool, loaded.config_hash.clone()))
        }
    };

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr: SocketAddr = settings
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address '{}'", settings.listen_addr))?;
    info!(
        store = settings.store.as_str(),
        config_hash = %loaded.config_hash,
        "convoy-daemon listening on http://{}",
        addr
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(tower_http::cors::Any)
}
