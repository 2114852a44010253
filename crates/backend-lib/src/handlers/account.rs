//! Login, registration, logout and the dashboard.
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use complaint_desk_common::{Flash, SessionUser};
use serde::Deserialize;
use tracing::info;

use super::{page_context, redirect_with_cookie, redirect_with_flash};
use crate::auth::{AuthUser, CurrentSession, LoginError};
use crate::error::AppError;
use crate::middleware::session_cookie;
use crate::storage::Storage;
use crate::validation::{validate_registration, RegisterForm, ValidationError};
use crate::{views, AppState};

pub const MISSING_CREDENTIALS: &str = "Missing credentials";
pub const LOGGED_OUT: &str = "You are logged out";
pub const USERNAME_TAKEN: &str = "Username already exists";
pub const REGISTERED: &str = "You are Successfully Registered and can Log in";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn dashboard<S>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthUser,
) -> Html<String>
where
    S: Storage + 'static,
{
    let ctx = page_context(&state.sessions, &auth.token, Some(&auth.user)).await;
    Html(views::dashboard(&ctx))
}

pub async fn login_form<S>(
    State(state): State<Arc<AppState<S>>>,
    session: CurrentSession,
) -> Html<String>
where
    S: Storage + 'static,
{
    let ctx = page_context(&state.sessions, &session.token, session.user.as_ref()).await;
    Html(views::login_page(&ctx))
}

pub async fn login<S>(
    State(state): State<Arc<AppState<S>>>,
    session: CurrentSession,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError>
where
    S: Storage + 'static,
{
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Ok(redirect_with_flash(
            &state.sessions,
            &session.token,
            Flash::error(MISSING_CREDENTIALS),
            "/login",
        )
        .await);
    }

    let user = match state.auth.authenticate(username, &form.password).await {
        Ok(user) => user,
        Err(LoginError::Internal(err)) => return Err(err),
        Err(refused) => {
            return Ok(redirect_with_flash(
                &state.sessions,
                &session.token,
                Flash::error(refused.to_string()),
                "/login",
            )
            .await);
        },
    };

    let home = user.role.home_path();
    let fresh = state
        .sessions
        .login(&session.token, SessionUser::from(&user))
        .await;
    info!(username = %user.username, role = %user.role, "user logged in");

    Ok(redirect_with_cookie(
        home,
        session_cookie(&state.settings.session, &fresh.token),
    ))
}

pub async fn register_form<S>(
    State(state): State<Arc<AppState<S>>>,
    session: CurrentSession,
) -> Html<String>
where
    S: Storage + 'static,
{
    let ctx = page_context(&state.sessions, &session.token, session.user.as_ref()).await;
    Html(views::register_page(&ctx, &[], &RegisterForm::default()))
}

pub async fn register<S>(
    State(state): State<Arc<AppState<S>>>,
    session: CurrentSession,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError>
where
    S: Storage + 'static,
{
    let registration = match validate_registration(&form, &state.settings.password_requirements) {
        Ok(registration) => registration,
        Err(err) => return Ok(invalid_registration(&state, &session, &form, &err).await),
    };

    match state.auth.register(registration).await {
        Ok(_) => Ok(redirect_with_flash(
            &state.sessions,
            &session.token,
            Flash::success(REGISTERED),
            "/login",
        )
        .await),
        Err(AppError::UsernameTaken(username)) => {
            info!(%username, "registration with taken username");
            Ok(redirect_with_flash(
                &state.sessions,
                &session.token,
                Flash::error(USERNAME_TAKEN),
                "/register",
            )
            .await)
        },
        Err(err) => Err(err),
    }
}

async fn invalid_registration<S>(
    state: &AppState<S>,
    session: &CurrentSession,
    form: &RegisterForm,
    err: &ValidationError,
) -> Response {
    let ctx = page_context(&state.sessions, &session.token, session.user.as_ref()).await;
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(views::register_page(&ctx, &err.messages(), form)),
    )
        .into_response()
}

pub async fn logout<S>(State(state): State<Arc<AppState<S>>>, auth: AuthUser) -> Response
where
    S: Storage + 'static,
{
    state.sessions.destroy(&auth.token).await;
    let fresh = state.sessions.create_session().await;
    state
        .sessions
        .push_flash(&fresh.token, Flash::success(LOGGED_OUT))
        .await;
    info!(username = %auth.user.username, "user logged out");

    redirect_with_cookie("/login", session_cookie(&state.settings.session, &fresh.token))
}
