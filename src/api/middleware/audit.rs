//! Audit logging middleware.
//!
//! Logs every API request with caller, method, path, and response status.
//! Runs innermost (after auth has injected CallerContext).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::CallerContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let subject = req
        .extensions()
        .get::<CallerContext>()
        .map(|c| c.user_id.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let response = next.run(req).await;

    tracing::info!(
        subject = %subject,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "API access"
    );
    response
}
