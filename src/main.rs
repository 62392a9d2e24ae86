//! FAQ Gateway - Main Application Entry Point
//!
//! This is the REST API behind an FAQ generator. Signed-in users extract
//! page text, generate FAQs with an LLM, score them for SEO and save them.
//! External clients reach the same generation through a public endpoint
//! gated by personal API keys and an hourly request window.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: session JWT for the UI, hashed API keys for the public API
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod extract;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{middleware::auth::SessionVerifier, services::llm::LlmClient, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // One HTTP client for page fetches and the LLM provider
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()?;

    let state = AppState {
        pool,
        llm: LlmClient::new(http.clone(), &config.openai_api_key, &config.openai_base_url),
        http,
        sessions: SessionVerifier::new(&config.auth_jwt_secret),
    };

    let app = router(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the HTTP router.
fn router(state: AppState) -> Router {
    // Public API, metered per API key. Callable from any origin.
    let public_routes = Router::new()
        .route(
            "/api/public/generate",
            post(handlers::public::generate),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.pool.clone(),
            middleware::api_key::api_key_middleware,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::POST, Method::OPTIONS])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
        );

    // Web UI routes, authenticated by the session token
    let session_routes = Router::new()
        .route("/api/user/sync", post(handlers::users::sync_user))
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).post(handlers::settings::update_settings),
        )
        .route("/api/key/generate", post(handlers::keys::generate_key))
        .route("/api/extract", post(handlers::generation::extract))
        .route("/api/generate", post(handlers::generation::generate))
        .route("/api/seo-score", post(handlers::generation::seo_score))
        .route(
            "/api/faqs",
            get(handlers::faqs::list_faq_sets).post(handlers::faqs::create_faq_set),
        )
        .route("/api/faqs/{id}", delete(handlers::faqs::delete_faq_set))
        .route(
            "/api/faqs/{id}/export",
            get(handlers::faqs::export_faq_set),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::session_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(public_routes)
        .merge(session_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
