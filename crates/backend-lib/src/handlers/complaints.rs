//! Student complaint pages.
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use complaint_desk_common::Flash;
use metrics::counter;
use tracing::info;

use super::{page_context, redirect_with_flash};
use crate::auth::extract::{Authorized, StudentOnly};
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::{NewComplaint, Storage};
use crate::validation::{validate_complaint, ComplaintForm};
use crate::{views, AppState};

pub const COMPLAINT_REGISTERED: &str = "Complaint registered successfully";

pub async fn complaint_form<S>(
    State(state): State<Arc<AppState<S>>>,
    student: Authorized<StudentOnly>,
) -> Html<String>
where
    S: Storage + 'static,
{
    let ctx = page_context(&state.sessions, student.token(), Some(student.user())).await;
    Html(views::complaint_form(&ctx, &[], &ComplaintForm::default()))
}

pub async fn register_complaint<S>(
    State(state): State<Arc<AppState<S>>>,
    student: Authorized<StudentOnly>,
    Form(form): Form<ComplaintForm>,
) -> Result<Response, AppError>
where
    S: Storage + 'static,
{
    let draft = match validate_complaint(&form) {
        Ok(draft) => draft,
        Err(err) => {
            let ctx = page_context(&state.sessions, student.token(), Some(student.user())).await;
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(views::complaint_form(&ctx, &err.messages(), &form)),
            )
                .into_response());
        },
    };

    let complaint = state
        .storage
        .insert_complaint(NewComplaint {
            title: draft.title,
            description: draft.description,
            user_id: student.user().id,
        })
        .await?;

    counter!(keys::COMPLAINT_FILED).increment(1);
    info!(
        number = complaint.number,
        username = %student.user().username,
        "complaint filed"
    );

    Ok(redirect_with_flash(
        &state.sessions,
        student.token(),
        Flash::success(COMPLAINT_REGISTERED),
        "/",
    )
    .await)
}

pub async fn my_complaints<S>(
    State(state): State<Arc<AppState<S>>>,
    student: Authorized<StudentOnly>,
) -> Result<Html<String>, AppError>
where
    S: Storage + 'static,
{
    let complaints = state.storage.complaints_by_user(student.user().id).await?;
    let ctx = page_context(&state.sessions, student.token(), Some(student.user())).await;
    Ok(Html(views::my_complaints(&ctx, &complaints)))
}
