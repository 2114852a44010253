// ============================
// complaint-desk-backend/src/config.rs
// ============================
//! Configuration management.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `COMPLAINT_DESK_` (nested keys use
//! `__`, e.g. `COMPLAINT_DESK_SESSION__TTL_SECS`).
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "COMPLAINT_DESK_";

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Longest session lifetime accepted from config (one year)
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Session cookie settings
    pub session: SessionSettings,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
    /// scrypt cost parameters
    pub password_hashing: HashingSettings,
    /// Login lockout settings
    pub login_throttle: LoginThrottleSettings,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Session cookie settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub ttl_secs: u64,
    /// Mark the cookie `Secure` (HTTPS only)
    pub secure_cookie: bool,
}

/// Password complexity requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRequirements {
    /// Minimum password length
    pub min_length: usize,
    /// Require uppercase letters
    pub require_uppercase: bool,
    /// Require lowercase letters
    pub require_lowercase: bool,
    /// Require digits
    pub require_digit: bool,
    /// Require special characters
    pub require_special: bool,
}

/// scrypt parameters used for new password hashes
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HashingSettings {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoginThrottleSettings {
    /// Failed attempts before a username is locked out
    pub max_attempts: u32,
    pub lockout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            session: SessionSettings::default(),
            password_requirements: PasswordRequirements::default(),
            password_hashing: HashingSettings::default(),
            login_throttle: LoginThrottleSettings::default(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "complaint_desk.sid".to_string(),
            ttl_secs: 60 * 60 * 24, // 1 day
            secure_cookie: false,
        }
    }
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_special: false,
        }
    }
}

impl Default for HashingSettings {
    fn default() -> Self {
        // scrypt's recommended interactive parameters
        Self {
            log_n: 17,
            r: 8,
            p: 1,
        }
    }
}

impl Default for LoginThrottleSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_secs: 5 * 60,
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from an explicit TOML file (if present) and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            bail!("invalid log level: {}", self.log_level);
        }
        if self.session.ttl_secs == 0 || self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            bail!(
                "session.ttl_secs must be between 1 and {MAX_SESSION_TTL_SECS}, got {}",
                self.session.ttl_secs
            );
        }
        if self.session.cookie_name.trim().is_empty()
            || self
                .session
                .cookie_name
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, ';' | ',' | '='))
        {
            bail!("invalid session cookie name: {:?}", self.session.cookie_name);
        }
        if self.password_requirements.min_length < 6 {
            bail!("password_requirements.min_length must be at least 6");
        }
        let hashing = self.password_hashing;
        if hashing.log_n == 0 || hashing.log_n >= 64 || hashing.r == 0 || hashing.p == 0 {
            bail!("invalid scrypt parameters: {hashing:?}");
        }
        if self.login_throttle.max_attempts == 0 {
            bail!("login_throttle.max_attempts must be greater than zero");
        }
        Ok(())
    }

    /// Session time to live
    pub fn session_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session.ttl_secs)
    }
}
