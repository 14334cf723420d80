//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        middleware::{require_reviewer, require_student},
        rest::{
            self, check_add_handler, check_drop_handler, eligibility_handler,
            list_requests_handler, offerings_handler, pending_requests_handler,
            resolve_request_handler, schedule_handler, submit_request_handler,
            validate_selection_handler,
        },
        state::AppState,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Student routes: identity forwarded by the auth gateway.
    let student_routes = Router::new()
        .route("/enrollment/eligibility", get(eligibility_handler))
        .route("/enrollment/offerings", get(offerings_handler))
        .route("/enrollment/schedule", get(schedule_handler))
        .route("/selection/check-add", post(check_add_handler))
        .route("/selection/check-drop", post(check_drop_handler))
        .route("/selection/validate", post(validate_selection_handler))
        .route(
            "/requests",
            post(submit_request_handler).get(list_requests_handler),
        )
        .layer(axum_middleware::from_fn(require_student));

    // Reviewer routes (department head).
    let reviewer_routes = Router::new()
        .route("/requests/pending", get(pending_requests_handler))
        .route("/requests/{id}/resolve", post(resolve_request_handler))
        .layer(axum_middleware::from_fn(require_reviewer));

    let api_router = Router::new()
        .merge(student_routes)
        .merge(reviewer_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new().merge(api_router).merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", rest::ApiDoc::openapi()),
    );

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
