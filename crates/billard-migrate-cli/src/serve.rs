//! HTTP trigger endpoint.
//!
//! A deliberately tiny surface: one GET route that runs the migration
//! synchronously and returns the wire report, plus a liveness probe. The
//! rest of the backend (auth, domain routes, static files) lives
//! elsewhere.

use axum::{extract::State, routing::get, Json, Router};
use billard_migrate::{Config, MigrateError, Orchestrator};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

struct AppState {
    config: Config,
    cancel: CancellationToken,
}

/// Run the trigger server until the cancellation token fires.
pub async fn run_server(
    config: Config,
    bind: &str,
    port: u16,
    cancel: CancellationToken,
) -> Result<(), MigrateError> {
    let state = Arc::new(AppState {
        config,
        cancel: cancel.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/migrate-data", get(migrate_data))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| MigrateError::Config(format!("invalid bind address: {}", e)))?;

    info!("Serving migration trigger on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    info!("Trigger server shut down");
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run one migration and return the wire report. Takes no parameters;
/// the configuration decides everything.
async fn migrate_data(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let orchestrator = match Orchestrator::new(state.config.clone()) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            return Json(serde_json::json!({
                "success": false,
                "error": e.to_string(),
                "results": [],
            }));
        }
    };

    let report = orchestrator.run(state.cancel.child_token()).await;
    match report.to_json_value() {
        Ok(value) => Json(value),
        Err(e) => Json(serde_json::json!({
            "success": false,
            "error": e.to_string(),
            "results": [],
        })),
    }
}
