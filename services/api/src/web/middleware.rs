//! services/api/src/web/middleware.rs
//!
//! Authentication middleware. Delegates entirely to the pluggable
//! `AuthService` port; with the no-op adapter every request passes and no
//! subject is established.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

use crate::web::state::AppState;

/// An authenticated caller identity, when one was established. Inserted
/// into request extensions for handlers that care.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Option<String>);

/// Middleware that runs the configured `AuthService` over the bearer token.
///
/// A failing auth service rejects the request with 401; a passing one
/// inserts the (possibly anonymous) identity into request extensions.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let subject = state.auth.authenticate(token).await.map_err(|e| {
        error!("Authentication failed: {:?}", e);
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(CallerIdentity(subject));
    Ok(next.run(req).await)
}
