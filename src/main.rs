use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use job_match::app_state::AppState;
use job_match::config::{AppConfig, StoreBackend};
use job_match::db::{self, InMemoryMatchStore, MatchStore, PgMatchStore};
use job_match::routes;
use job_match::services::auth::AuthService;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing job-match server");

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!(
        "dashboard_page_requests_total",
        "Match page requests served"
    );
    metrics::describe_counter!(
        "dashboard_count_requests_total",
        "Match count requests served"
    );
    metrics::describe_counter!(
        "dashboard_store_failures_total",
        "Store queries that failed and were degraded to empty results"
    );
    metrics::describe_counter!(
        "dashboard_status_updates_total",
        "Evaluation status changes applied"
    );
    metrics::describe_histogram!(
        "dashboard_query_seconds",
        "Time spent in record store queries per dashboard operation"
    );

    let store: Arc<dyn MatchStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL is required for the postgres store backend");

            tracing::info!("Connecting to PostgreSQL database");
            let db_pool = db::init_pool(database_url)
                .await
                .expect("Failed to connect to database");

            tracing::info!("Running database migrations");
            db::run_migrations(&db_pool)
                .await
                .expect("Failed to run database migrations");

            Arc::new(PgMatchStore::new(db_pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory match store; it starts empty and has no ingestion path, smoke tests only");
            Arc::new(InMemoryMatchStore::new())
        }
    };

    let auth = AuthService::new(&config.jwt_secret).expect("Failed to initialize token verification");

    let state = AppState::new(store, auth, config.default_page_size);

    let app = routes::api_router(state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    tracing::info!("Starting job-match on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
