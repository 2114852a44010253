// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers for the server-rendered pages.
pub mod account;
pub mod admin;
pub mod complaints;
pub mod staff;

use axum::{
    http::{header, uri::Authority, HeaderMap, HeaderValue, Uri},
    response::{IntoResponse, Redirect, Response},
};
use complaint_desk_common::{Flash, SessionUser};

use crate::auth::SessionManager;
use crate::views::PageContext;

/// Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

/// Queue `flash` on the session and redirect to `to`
pub(crate) async fn redirect_with_flash(
    sessions: &SessionManager,
    token: &str,
    flash: Flash,
    to: &str,
) -> Response {
    sessions.push_flash(token, flash).await;
    Redirect::to(to).into_response()
}

/// Redirect that also replaces the session cookie
pub(crate) fn redirect_with_cookie(to: &str, cookie: HeaderValue) -> Response {
    let mut response = Redirect::to(to).into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie);
    response
}

/// Local path of the `Referer` header. Off-site referers are ignored.
pub(crate) fn referer_path(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::REFERER)?.to_str().ok()?;
    let uri: Uri = raw.parse().ok()?;
    let path = uri.path_and_query()?.as_str();
    if !path.starts_with('/') || path.starts_with("//") {
        return None;
    }
    if let Some(host) = uri.host() {
        let own = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.parse::<Authority>().ok());
        if !own.is_some_and(|own| own.host().eq_ignore_ascii_case(host)) {
            return None;
        }
    }
    Some(path.to_string())
}

/// Build the page context, draining any queued flashes
pub(crate) async fn page_context<'a>(
    sessions: &SessionManager,
    token: &str,
    user: Option<&'a SessionUser>,
) -> PageContext<'a> {
    PageContext::new(user, sessions.take_flashes(token).await)
}
