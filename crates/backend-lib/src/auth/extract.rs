//! Request extractors for the session identity and role gates.
use std::marker::PhantomData;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use complaint_desk_common::{Flash, Role, SessionUser};

use crate::error::AppError;
use crate::AppState;

/// Flash shown when a page is requested without the right login or role
pub const NOT_AUTHORIZED_PAGE: &str = "You are not Authorized to view this page";

/// The session attached to this request by the session middleware
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
    pub user: Option<SessionUser>,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session middleware not installed".to_string()))
    }
}

/// A signed-in user. Anonymous requests are sent to `/login` with a flash.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub token: String,
    pub user: SessionUser,
}

impl<S> FromRequestParts<Arc<AppState<S>>> for AuthUser
where
    S: Send + Sync + 'static,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let session = CurrentSession::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match session.user {
            Some(user) => Ok(AuthUser {
                token: session.token,
                user,
            }),
            None => {
                tracing::debug!(path = %parts.uri.path(), "anonymous request to protected page");
                state
                    .sessions
                    .push_flash(&session.token, Flash::error(NOT_AUTHORIZED_PAGE))
                    .await;
                Err(Redirect::to("/login").into_response())
            },
        }
    }
}

/// Set of roles allowed through an [`Authorized`] extractor
pub trait RoleGate: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

pub struct AdminOnly;
pub struct StudentOnly;
pub struct ResolverOnly;
pub struct EngineerOnly;
/// Admins and resolvers
pub struct Staff;

impl RoleGate for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

impl RoleGate for StudentOnly {
    const ALLOWED: &'static [Role] = &[Role::Student];
}

impl RoleGate for ResolverOnly {
    const ALLOWED: &'static [Role] = &[Role::Resolver];
}

impl RoleGate for EngineerOnly {
    const ALLOWED: &'static [Role] = &[Role::JuniorEngineer];
}

impl RoleGate for Staff {
    const ALLOWED: &'static [Role] = &[Role::Admin, Role::Resolver];
}

/// A signed-in user whose role passes gate `G`. Other roles are sent back to
/// their own home page with a flash.
pub struct Authorized<G> {
    pub auth: AuthUser,
    _gate: PhantomData<G>,
}

impl<G> Authorized<G> {
    pub fn user(&self) -> &SessionUser {
        &self.auth.user
    }

    pub fn token(&self) -> &str {
        &self.auth.token
    }
}

impl<S, G> FromRequestParts<Arc<AppState<S>>> for Authorized<G>
where
    S: Send + Sync + 'static,
    G: RoleGate,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        if G::ALLOWED.contains(&auth.user.role) {
            return Ok(Authorized {
                auth,
                _gate: PhantomData,
            });
        }

        tracing::info!(
            username = %auth.user.username,
            role = %auth.user.role,
            path = %parts.uri.path(),
            "role gate denied request"
        );
        state
            .sessions
            .push_flash(&auth.token, Flash::error(NOT_AUTHORIZED_PAGE))
            .await;
        Err(Redirect::to(auth.user.role.home_path()).into_response())
    }
}
