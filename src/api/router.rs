//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! Extension(ApiContext) → Auth validator → Audit logger → Handler

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    // Path params use `:param` syntax (matchit 0.7 / axum 0.7); a segment
    // position shared by several routes must use the same param name.
    let protected = Router::new()
        .route("/logout", post(endpoints::auth::logout))
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            put(endpoints::patients::update).delete(endpoints::patients::remove),
        )
        .route(
            "/patients/:id/records",
            get(endpoints::records::list).post(endpoints::records::create),
        )
        .route(
            "/patients/:id/records/:rid/save_as_template",
            post(endpoints::templates::save_from_record),
        )
        .route(
            "/patients/:id/records/from_template/:tid",
            post(endpoints::records::from_template),
        )
        .route(
            "/templates",
            get(endpoints::templates::list).post(endpoints::templates::create),
        )
        .route(
            "/templates/:id",
            get(endpoints::templates::detail)
                .put(endpoints::templates::update)
                .delete(endpoints::templates::remove),
        )
        .route("/departments/stats", get(endpoints::departments::stats))
        .route(
            "/ai/record_suggestion",
            post(endpoints::assist::record_suggestion),
        )
        .route(
            "/ai/template_suggestions",
            post(endpoints::assist::template_suggestions),
        )
        .with_state(ctx.clone())
        // innermost first
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/register", post(endpoints::auth::register))
        .route("/login", post(endpoints::auth::login))
        .with_state(ctx);

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(CorsLayer::permissive())
}
