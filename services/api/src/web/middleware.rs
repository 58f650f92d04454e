//! services/api/src/web/middleware.rs
//!
//! Authentication and role-gating middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};
use booking_core::{GuardDecision, PortError, Role, RoleGuard, SessionContext};
use std::sync::Arc;
use tracing::{error, warn};

use crate::web::state::AppState;

/// Pulls the auth session id out of the `session=` cookie.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty())
}

/// Turns a guard decision into either "continue" or the status code to stop with.
pub fn enforce(guard: &RoleGuard, session: &SessionContext) -> Result<(), StatusCode> {
    match guard.evaluate(session) {
        GuardDecision::Render => Ok(()),
        GuardDecision::Pending => Err(StatusCode::SERVICE_UNAVAILABLE),
        GuardDecision::RedirectToLogin => Err(StatusCode::UNAUTHORIZED),
        GuardDecision::RedirectToUnauthorized => Err(StatusCode::FORBIDDEN),
    }
}

/// Middleware that resolves the session cookie into a `SessionContext`.
///
/// If valid, inserts the context into request extensions for handlers and the
/// role middlewares to use. If invalid or missing, returns 401 Unauthorized;
/// if the session store itself fails, 500.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let account_id = match session_cookie(req.headers()) {
        Some(auth_session_id) => match state.identity.validate_auth_session(auth_session_id).await {
            Ok(account_id) => Some(account_id),
            Err(PortError::Unexpected(msg)) => {
                error!("Session lookup failed: {}", msg);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
            Err(e) => {
                warn!("Rejected auth session: {:?}", e);
                None
            }
        },
        None => None,
    };

    let mut session = SessionContext::loading();
    session.initialize(state.gateway.as_ref(), account_id).await;
    enforce(&RoleGuard::authenticated(), &session)?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Lets only administrators through. Must run inside `require_auth`.
pub async fn require_admin(
    Extension(session): Extension<SessionContext>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    enforce(&RoleGuard::only(&[Role::Admin]), &session)?;
    Ok(next.run(req).await)
}

/// Lets doctors and administrators through. Must run inside `require_auth`.
pub async fn require_clinician(
    Extension(session): Extension<SessionContext>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    enforce(&RoleGuard::only(&[Role::Doctor, Role::Admin]), &session)?;
    Ok(next.run(req).await)
}
