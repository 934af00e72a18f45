//! buzzpulse server: anonymous presence aggregation over HTTP.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use pulse_db::queries::hits;
use pulse_server::{build_router, now_secs, AppState, ServerConfig};
use pulse_types::SECS_PER_DAY;

/// Minimum hit-log retention: the typical-hour baseline looks back 7 days.
const MIN_RETENTION_DAYS: u32 = 7;

/// How often the retention sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pulse=info".parse()?),
        )
        .init();

    info!("buzzpulse server starting");

    let config = ServerConfig::load()?;

    if !config.store.data_dir.is_empty() {
        std::fs::create_dir_all(&config.store.data_dir)?;
    }

    let db_path = config.db_path();
    let conn = pulse_db::open(&db_path)?;
    info!(?db_path, "store opened");

    let state = AppState::new(conn, &config);

    if let Some(days) = config.store.hit_retention_days {
        let days = days.max(MIN_RETENTION_DAYS);
        info!(days, "hit retention sweep enabled");
        tokio::spawn(retention_sweep(state.db.clone(), days));
    }

    let router = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    tokio::select! {
        result = axum::serve(listener, router) => {
            if let Err(e) = result {
                error!("server error: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    info!("buzzpulse server stopped");
    Ok(())
}

/// Periodically drop hits older than the retention horizon.
async fn retention_sweep(
    db: Arc<tokio::sync::Mutex<rusqlite::Connection>>,
    retention_days: u32,
) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let cutoff = now_secs().saturating_sub(u64::from(retention_days) * SECS_PER_DAY);
        let conn = db.lock().await;
        match hits::prune_before(&conn, cutoff) {
            Ok(removed) if removed > 0 => info!(removed, "retention sweep pruned hits"),
            Ok(_) => {}
            Err(e) => error!("retention sweep failed: {e}"),
        }
    }
}
