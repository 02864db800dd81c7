mod config;
mod customers;
mod db;
mod errors;
mod handlers;
mod models;
mod reports;
mod simulations;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;

/// Main entry point for the application.
///
/// Initializes logging, configuration, and the database pool (including the
/// schema bootstrap), then assembles the router and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loan_simulation_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize database connection pool and bootstrap the schema
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // Build application state
    let app_state = Arc::new(handlers::AppState { db: db.pool.clone() });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        // Customer endpoints
        .route(
            "/customers",
            post(handlers::create_customer)
                .get(handlers::list_customers)
                .delete(handlers::delete_all_customers),
        )
        .route("/customers/count", get(handlers::count_customers))
        .route("/customers/cpf/:cpf", get(handlers::get_customer_by_cpf))
        .route(
            "/customers/:id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .patch(handlers::patch_customer)
                .delete(handlers::delete_customer),
        )
        .route("/customers/:id/exists", get(handlers::customer_exists))
        // Simulation endpoints
        .route("/simulations", get(handlers::list_simulations))
        .route(
            "/simulations/customer/:customer_id",
            get(handlers::list_simulations_by_customer),
        )
        .route(
            "/simulations/customer/:customer_id/export/txt",
            get(handlers::export_simulations_txt),
        )
        .route(
            "/simulations/customer/:customer_id/export/csv",
            get(handlers::export_simulations_csv),
        )
        .route(
            "/simulations/customer/:customer_id/simulacao-especifica",
            post(handlers::create_specific_simulation),
        )
        .route("/simulations/:id", get(handlers::get_simulation))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB max payload (prevents memory exhaustion)
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Build final app with health check bypassing rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
