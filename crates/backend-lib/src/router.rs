// ============================
// complaint-desk-backend/src/router.rs
// ============================
//! Route table.
use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{account, admin, complaints, health, staff};
use crate::middleware::session_layer;
use crate::storage::Storage;
use crate::AppState;

/// Create the application router
pub fn create_router<S: Storage + Clone + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(account::dashboard::<S>))
        .route("/login", get(account::login_form::<S>).post(account::login::<S>))
        .route(
            "/register",
            get(account::register_form::<S>).post(account::register::<S>),
        )
        .route("/logout", get(account::logout::<S>))
        .route("/complaint", get(complaints::complaint_form::<S>))
        .route("/registerComplaint", post(complaints::register_complaint::<S>))
        .route("/my-complaints", get(complaints::my_complaints::<S>))
        .route("/admin", get(admin::admin_page::<S>))
        .route("/assign", post(admin::assign::<S>))
        .route("/updateStatus", post(staff::update_status::<S>))
        .route("/resolver", get(staff::resolver_page::<S>))
        .route("/jeng", get(staff::engineer_page::<S>))
        .layer(from_fn_with_state(state.clone(), session_layer::<S>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
