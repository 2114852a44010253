// ============================
// complaint-desk-backend/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod extract;
pub mod password;
pub mod rate_limit;
pub mod session;
pub mod token_generator;
mod service;
mod service_impl;

pub use extract::{AuthUser, CurrentSession};
pub use password::{
    hash_password, hash_password_secure, password_strength_errors, verify_password,
};
pub use rate_limit::LoginThrottle;
pub use service::{AuthService, LoginError};
pub use service_impl::DefaultAuth;
pub use session::{Session, SessionManager, SESSION_TTL};
