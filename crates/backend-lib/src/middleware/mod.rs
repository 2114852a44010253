// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the complaint desk server.

pub mod session;

pub use session::{read_cookie, session_cookie, session_layer};
