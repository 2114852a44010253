//! Admin overview and complaint assignment.
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use complaint_desk_common::{Flash, Role};
use metrics::counter;
use tracing::{info, warn};

use super::{page_context, redirect_with_flash};
use crate::auth::extract::{AdminOnly, Authorized};
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::Storage;
use crate::validation::{validate_assignment, AssignForm};
use crate::workflow::{group_by_department, plan_assignment};
use crate::{views, AppState};

pub const ASSIGNED: &str = "You have successfully assigned a complaint to Resolver";
pub const COMPLAINT_NOT_FOUND: &str = "Complaint not found";

async fn render_admin<S: Storage>(
    state: &AppState<S>,
    admin: &Authorized<AdminOnly>,
    errors: &[String],
) -> Result<String, AppError> {
    let users = state.storage.users().await?;
    let groups = group_by_department(state.storage.complaints().await?, &users);
    let resolvers = state.storage.users_with_role(Role::Resolver).await?;

    let ctx = page_context(&state.sessions, admin.token(), Some(admin.user())).await;
    Ok(views::admin_page(&ctx, &groups, &resolvers, errors))
}

pub async fn admin_page<S>(
    State(state): State<Arc<AppState<S>>>,
    admin: Authorized<AdminOnly>,
) -> Result<Html<String>, AppError>
where
    S: Storage + 'static,
{
    Ok(Html(render_admin(&state, &admin, &[]).await?))
}

pub async fn assign<S>(
    State(state): State<Arc<AppState<S>>>,
    admin: Authorized<AdminOnly>,
    Form(form): Form<AssignForm>,
) -> Result<Response, AppError>
where
    S: Storage + 'static,
{
    let request = match validate_assignment(&form) {
        Ok(request) => request,
        Err(err) => {
            let page = render_admin(&state, &admin, &err.messages()).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        },
    };

    let resolver = state
        .storage
        .user_by_username(&request.resolver_username)
        .await?;
    let assignment = match plan_assignment(admin.user(), &request.resolver_username, resolver.as_ref()) {
        Ok(assignment) => assignment,
        Err(err) => {
            warn!(resolver = %request.resolver_username, error = %err, "assignment refused");
            return Ok(redirect_with_flash(
                &state.sessions,
                admin.token(),
                Flash::error(err.to_string()),
                "/admin",
            )
            .await);
        },
    };

    let complaint = match state
        .storage
        .assign_complaint(request.complaint_id, assignment)
        .await
    {
        Ok(complaint) => complaint,
        Err(AppError::ComplaintNotFound(id)) => {
            warn!(complaint_id = %id, "assignment to unknown complaint");
            return Ok(redirect_with_flash(
                &state.sessions,
                admin.token(),
                Flash::error(COMPLAINT_NOT_FOUND),
                "/admin",
            )
            .await);
        },
        Err(err) => return Err(err),
    };

    counter!(keys::COMPLAINT_ASSIGNED).increment(1);
    info!(
        number = complaint.number,
        resolver = %request.resolver_username,
        admin = %admin.user().username,
        "complaint assigned"
    );

    Ok(redirect_with_flash(
        &state.sessions,
        admin.token(),
        Flash::success(ASSIGNED),
        "/admin",
    )
    .await)
}
