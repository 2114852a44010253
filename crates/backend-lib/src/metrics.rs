// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_ACTIVE: &str = "session.active";
pub const SESSION_EXPIRED: &str = "session.expired";
pub const USER_REGISTERED: &str = "user.registered";
pub const LOGIN_SUCCEEDED: &str = "login.succeeded";
pub const LOGIN_FAILED: &str = "login.failed";
pub const COMPLAINT_FILED: &str = "complaint.filed";
pub const COMPLAINT_ASSIGNED: &str = "complaint.assigned";
pub const COMPLAINT_STATUS_CHANGED: &str = "complaint.status_changed";
