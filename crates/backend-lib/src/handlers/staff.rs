//! Resolver and junior engineer pages, and status updates.
use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use complaint_desk_common::Flash;
use metrics::counter;
use tracing::{info, warn};
use uuid::Uuid;

use super::admin::COMPLAINT_NOT_FOUND;
use super::{page_context, redirect_with_flash, referer_path};
use crate::auth::extract::{Authorized, EngineerOnly, ResolverOnly, Staff};
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::Storage;
use crate::validation::{validate_status_change, StatusForm};
use crate::workflow::{authorize_status_change, UNKNOWN_DEPARTMENT};
use crate::{views, AppState};

pub const STATUS_UPDATED: &str = "Complaint status updated";

pub async fn resolver_page<S>(
    State(state): State<Arc<AppState<S>>>,
    resolver: Authorized<ResolverOnly>,
) -> Result<Html<String>, AppError>
where
    S: Storage + 'static,
{
    let complaints = state.storage.complaints_assigned_to(resolver.user().id).await?;
    let ctx = page_context(&state.sessions, resolver.token(), Some(resolver.user())).await;
    Ok(Html(views::resolver_page(&ctx, &complaints)))
}

/// Complaints filed by users of the engineer's own department
pub async fn engineer_page<S>(
    State(state): State<Arc<AppState<S>>>,
    engineer: Authorized<EngineerOnly>,
) -> Result<Html<String>, AppError>
where
    S: Storage + 'static,
{
    let department = engineer.user().department.trim();
    let filers: HashSet<Uuid> = state
        .storage
        .users()
        .await?
        .into_iter()
        .filter(|u| !department.is_empty() && u.department.trim().eq_ignore_ascii_case(department))
        .map(|u| u.id)
        .collect();

    let mut complaints: Vec<_> = state
        .storage
        .complaints()
        .await?
        .into_iter()
        .filter(|c| filers.contains(&c.user_id))
        .collect();
    complaints.sort_by_key(|c| c.number);

    let label = if department.is_empty() {
        UNKNOWN_DEPARTMENT
    } else {
        department
    };
    let ctx = page_context(&state.sessions, engineer.token(), Some(engineer.user())).await;
    Ok(Html(views::engineer_page(&ctx, label, &complaints)))
}

pub async fn update_status<S>(
    State(state): State<Arc<AppState<S>>>,
    staff: Authorized<Staff>,
    headers: HeaderMap,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError>
where
    S: Storage + 'static,
{
    let back = referer_path(&headers).unwrap_or_else(|| staff.user().role.home_path().to_string());

    let change = match validate_status_change(&form) {
        Ok(change) => change,
        Err(err) => {
            for message in err.messages() {
                state.sessions.push_flash(staff.token(), Flash::error(message)).await;
            }
            return Ok(Redirect::to(&back).into_response());
        },
    };

    let Some(complaint) = state.storage.complaint(change.complaint_id).await? else {
        warn!(complaint_id = %change.complaint_id, "status change for unknown complaint");
        return Ok(redirect_with_flash(
            &state.sessions,
            staff.token(),
            Flash::error(COMPLAINT_NOT_FOUND),
            &back,
        )
        .await);
    };

    if let Err(denied) = authorize_status_change(staff.user(), &complaint, change.status) {
        warn!(
            username = %staff.user().username,
            number = complaint.number,
            status = %change.status,
            "status change denied"
        );
        return Ok(redirect_with_flash(
            &state.sessions,
            staff.token(),
            Flash::error(denied.to_string()),
            &back,
        )
        .await);
    }

    let updated = state
        .storage
        .update_complaint_status(complaint.id, change.status)
        .await?;

    counter!(keys::COMPLAINT_STATUS_CHANGED, "status" => updated.status.label()).increment(1);
    info!(
        number = updated.number,
        status = %updated.status,
        username = %staff.user().username,
        "complaint status changed"
    );

    Ok(redirect_with_flash(
        &state.sessions,
        staff.token(),
        Flash::success(STATUS_UPDATED),
        &back,
    )
    .await)
}
