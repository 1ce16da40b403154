//! Audit logging middleware.
//!
//! Logs every authenticated request with user, method, path, and
//! response status. Runs innermost (after auth has injected UserContext).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::UserContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let user = req
        .extensions()
        .get::<UserContext>()
        .map(|u| u.username.clone())
        .unwrap_or_default();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        %user,
        status = response.status().as_u16(),
        "api access"
    );
    response
}
