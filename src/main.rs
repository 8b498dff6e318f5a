//! Research Agent Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use research_agent_api::config::AppConfig;
use shuttle_axum::ShuttleAxum;
use tracing::info;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    research_agent_api::init_tracing();

    let cfg = AppConfig::load_default()?;
    info!(
        history = %cfg.history_path.display(),
        default_depth = cfg.default_depth,
        metrics = cfg.metrics_route,
        "config loaded"
    );

    let router = research_agent_api::create_router(&cfg)?;

    Ok(router.into())
}
