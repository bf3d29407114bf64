//! services/api/src/web/middleware.rs
//!
//! Session middleware for the education form.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};
use uuid::Uuid;

use crate::web::state::SessionId;

pub const SESSION_COOKIE: &str = "edu_session";

/// Finds a well-formed session id among the request's cookies.
fn session_from_cookies(req: &Request) -> Option<SessionId> {
    req.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|c| c.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .and_then(|value| Uuid::parse_str(value).ok())
        .map(SessionId)
}

/// Middleware that attaches a `SessionId` to every request.
///
/// If the browser already carries a valid session cookie it is reused. Otherwise
/// a fresh id is assigned and returned in a `Set-Cookie` header.
pub async fn assign_session(mut req: Request, next: Next) -> Response {
    // 1. Reuse the session from the cookie, or start a new one
    let (session_id, is_new) = match session_from_cookies(&req) {
        Some(existing) => (existing, false),
        None => (SessionId::new(), true),
    };

    // 2. Expose it to handlers
    req.extensions_mut().insert(session_id);

    // 3. Continue to the handler
    let mut response = next.run(req).await;

    // 4. Hand a new session id back to the browser
    if is_new {
        debug!(session_id = %session_id, "Started new form session");
        let cookie = format!("{SESSION_COOKIE}={session_id}; HttpOnly; SameSite=Lax; Path=/");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => error!("Failed to build session cookie: {:?}", e),
        }
    }
    response
}
