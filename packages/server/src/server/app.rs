//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::middleware::session_auth_middleware;
use crate::server::routes::{admin, errands, health_handler, notifications, wallet};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    /// Present in production; the health check pings it.
    pub db_pool: Option<PgPool>,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Build the Axum application router
pub fn build_app(
    deps: Arc<ServerDeps>,
    db_pool: Option<PgPool>,
    allowed_origins: Vec<String>,
) -> Router {
    let app_state = AppState { deps, db_pool };

    let errand_routes = Router::new()
        .route("/errand/draft", get(errands::draft_handler))
        .route("/errand/market", get(errands::market_handler))
        .route("/errands", get(errands::list_handler))
        .route(
            "/errand/:id",
            get(errands::get_handler)
                .patch(errands::update_draft_handler)
                .post(errands::publish_handler),
        )
        .route("/errand/:id/cancel", delete(errands::cancel_handler))
        .route("/errand/:id/complete", patch(errands::complete_handler))
        .route("/errand/:id/bid", post(errands::submit_bid_handler))
        .route("/errand/:id/bid/:bid_id", put(errands::counter_offer_handler))
        .route("/errand/:id/bid/:bid_id/accept", post(errands::accept_bid_handler))
        .route("/errand/:id/bid/:bid_id/reject", post(errands::reject_bid_handler))
        .route(
            "/errand/:id/bid/:bid_id/respond",
            put(errands::accept_contract_handler).delete(errands::reject_contract_handler),
        )
        .route("/errand/:id/timeline", post(errands::post_timeline_handler))
        .route(
            "/errand/:id/timeline/request",
            get(errands::request_timeline_handler),
        )
        .route("/errand/:id/rate", post(errands::rate_handler));

    let account_routes = Router::new()
        .route("/wallet", get(wallet::wallet_handler))
        .route("/wallet/top-up", post(wallet::top_up_handler))
        .route("/wallet/withdraw", post(wallet::withdraw_handler))
        .route("/notifications", get(notifications::list_handler));

    let admin_routes = Router::new()
        .route("/errands", get(admin::list_errands_handler))
        .route("/errand", post(admin::create_offline_errand_handler))
        .route("/errand/:id/assign", post(admin::assign_runner_handler));

    Router::new()
        .nest(
            "/v1",
            errand_routes
                .merge(account_routes)
                .nest("/admin", admin_routes),
        )
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(session_auth_middleware))
        .layer(Extension(app_state)) // Add shared state (must be after middlewares that need it)
        .layer(cors_layer(&allowed_origins))
        .layer(TraceLayer::new_for_http())
}
