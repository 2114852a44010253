use async_trait::async_trait;
use complaint_desk_common::User;
use thiserror::Error;

use crate::error::AppError;
use crate::validation::Registration;

/// Reasons a login attempt is refused
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("No user found")]
    UnknownUser,

    #[error("Wrong Password")]
    WrongPassword,

    #[error("Too many failed login attempts, please try again later")]
    LockedOut,

    #[error(transparent)]
    Internal(#[from] AppError),
}

/// Local-credential strategy: registration and username/password checks
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Hash the password and store a new user
    async fn register(&self, registration: Registration) -> Result<User, AppError>;

    /// Look up `username` and verify `password` against its stored hash
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, LoginError>;
}
