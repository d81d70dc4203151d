//! slotswap server entry point.
//!
//! Starts the Axum HTTP server and, when enabled, the persistence
//! background tasks (event log writer and snapshot loop).

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use slotswap::api;
use slotswap::app_state::AppState;
use slotswap::config::ServiceConfig;
use slotswap::domain::{EventBus, RequestStore, SlotStore};
use slotswap::persistence::{PostgresPersistence, tasks};
use slotswap::service::SwapService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ServiceConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting slotswap");

    // Build domain layer
    let slots = Arc::new(SlotStore::new());
    let requests = Arc::new(RequestStore::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let swap_service = Arc::new(SwapService::new(slots, requests, event_bus.clone()));

    // Persistence: restore the latest snapshot, then keep the event log
    // and snapshot tables up to date in the background.
    if config.persistence_enabled {
        let persistence = PostgresPersistence::connect(&config).await?;
        persistence.run_migrations().await?;

        let restored = tasks::restore_from_snapshot(&persistence, &swap_service).await?;
        if !restored {
            tracing::info!("no market snapshot found, starting empty");
        }

        if config.event_log_enabled {
            let _writer =
                tasks::spawn_event_log_writer(persistence.clone(), event_bus.subscribe());
        }
        let _snapshots = tasks::spawn_snapshot_loop(
            persistence,
            Arc::clone(&swap_service),
            config.snapshot_interval_secs,
            config.cleanup_after_days,
        );
    } else {
        tracing::warn!("persistence disabled, market state is in-memory only");
    }

    // Build application state
    let app_state = AppState {
        swap_service,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
