// ============================
// complaint-desk-backend/src/lib.rs
// ============================
//! Core functionality for the complaint desk server: credential and
//! complaint stores, session authentication, role-gated routes and the
//! server-rendered pages.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod telemetry;
pub mod validation;
pub mod views;
pub mod workflow;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth, LoginThrottle, SessionManager};
use crate::config::Settings;
use crate::storage::{FlatFileStorage, Storage};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Session manager
    pub sessions: SessionManager,
    /// Failed-login tracker shared with `auth`
    pub throttle: LoginThrottle,
    /// Settings
    pub settings: Arc<Settings>,
    /// Storage backend
    pub storage: S,
}

impl<S> AppState<S>
where
    S: Storage + Clone + 'static,
{
    /// Create a new application state
    pub fn new(storage: S, config: &Settings) -> Self {
        let sessions = SessionManager::new(config.session_ttl());
        let throttle = LoginThrottle::from_settings(&config.login_throttle);
        let auth = Arc::new(DefaultAuth::new(
            storage.clone(),
            config.password_hashing,
            throttle.clone(),
        ));

        Self {
            auth,
            sessions,
            throttle,
            settings: Arc::new(config.clone()),
            storage,
        }
    }
}

impl AppState<FlatFileStorage> {
    /// Open the configured data directory and build the state around it
    pub fn from_settings(config: &Settings) -> anyhow::Result<Self> {
        let storage = FlatFileStorage::new(&config.data_dir)?;
        Ok(Self::new(storage, config))
    }
}
