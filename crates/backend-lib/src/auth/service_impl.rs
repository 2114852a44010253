use async_trait::async_trait;
use chrono::Utc;
use complaint_desk_common::User;
use metrics::counter;
use uuid::Uuid;

use super::{hash_password_secure, verify_password, AuthService, LoginError, LoginThrottle};
use crate::config::HashingSettings;
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::Storage;
use crate::validation::Registration;

/// Auth service backed by the credential store
pub struct DefaultAuth<S> {
    storage: S,
    hashing: HashingSettings,
    throttle: LoginThrottle,
}

impl<S> DefaultAuth<S> {
    pub fn new(storage: S, hashing: HashingSettings, throttle: LoginThrottle) -> Self {
        Self {
            storage,
            hashing,
            throttle,
        }
    }
}

#[async_trait]
impl<S: Storage> AuthService for DefaultAuth<S> {
    async fn register(&self, registration: Registration) -> Result<User, AppError> {
        let Registration {
            name,
            username,
            email,
            mut password,
            role,
            department,
        } = registration;

        let cost = self.hashing;
        // keep scrypt off the async workers
        let password_hash = tokio::task::spawn_blocking(move || hash_password_secure(&mut password, &cost))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))??;

        let user = User {
            id: Uuid::new_v4(),
            name,
            username,
            email,
            password_hash,
            role,
            department,
            created_at: Utc::now(),
        };

        let user = self.storage.create_user(user).await?;
        counter!(keys::USER_REGISTERED, "role" => user.role.as_str()).increment(1);
        tracing::info!(username = %user.username, role = %user.role, "user registered");
        Ok(user)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, LoginError> {
        let username = username.trim();
        if !self.throttle.check(username) {
            counter!(keys::LOGIN_FAILED, "reason" => "locked").increment(1);
            return Err(LoginError::LockedOut);
        }

        let Some(user) = self.storage.user_by_username(username).await? else {
            self.throttle.record_failed_attempt(username);
            counter!(keys::LOGIN_FAILED, "reason" => "unknown_user").increment(1);
            tracing::info!(username, "login rejected: unknown user");
            return Err(LoginError::UnknownUser);
        };

        let hash = user.password_hash.clone();
        let plain = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&hash, &plain))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))?;

        if !matches {
            self.throttle.record_failed_attempt(username);
            counter!(keys::LOGIN_FAILED, "reason" => "wrong_password").increment(1);
            tracing::info!(username, "login rejected: wrong password");
            return Err(LoginError::WrongPassword);
        }

        self.throttle.record_success(username);
        counter!(keys::LOGIN_SUCCEEDED).increment(1);
        Ok(user)
    }
}
