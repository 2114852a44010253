//! Session cookie middleware.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::auth::CurrentSession;
use crate::config::SessionSettings;
use crate::AppState;

/// Find a cookie value in the request headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(settings: &SessionSettings, token: &str) -> HeaderValue {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        settings.cookie_name, token, settings.ttl_secs
    );
    if settings.secure_cookie {
        cookie.push_str("; Secure");
    }
    // tokens are base64url and cookie names are validated at load time
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

fn sets_session_cookie(response: &Response, name: &str) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split_once('=').is_some_and(|(key, _)| key == name))
}

/// Attach a session to every request, creating an anonymous one when the
/// cookie is missing, unknown or expired.
pub async fn session_layer<S>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    S: Send + Sync + 'static,
{
    let cookie_settings = &state.settings.session;

    let existing = match read_cookie(request.headers(), &cookie_settings.cookie_name) {
        Some(token) => state.sessions.get(&token).await,
        None => None,
    };

    let (session, is_new) = match existing {
        Some(session) => (session, false),
        None => (state.sessions.create_session().await, true),
    };

    request.extensions_mut().insert(CurrentSession {
        token: session.token.clone(),
        user: session.user.clone(),
    });

    let mut response = next.run(request).await;

    // login/logout issue their own cookie
    if is_new && !sets_session_cookie(&response, &cookie_settings.cookie_name) {
        response
            .headers_mut()
            .append(header::SET_COOKIE, session_cookie(cookie_settings, &session.token));
    }

    response
}
