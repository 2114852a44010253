// ================
// common/src/lib.rs
// ================
//! Common types shared by the complaint desk backend and its binaries.
//! This module defines the user, role, complaint and flash-message documents.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Sequence number type for complaint numbering
pub type Seq = u64;

/// Name of the counter document complaint numbers are drawn from
pub const COMPLAINT_SEQUENCE: &str = "complaint";

/// Error returned when a role or status label is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("unknown complaint status: {0}")]
    UnknownStatus(String),
}

/// Roles a user can register with
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "student")]
    Student,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "resolver")]
    Resolver,
    /// Junior engineer
    #[serde(rename = "jeng")]
    JuniorEngineer,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Student,
        Role::Admin,
        Role::Resolver,
        Role::JuniorEngineer,
    ];

    /// Form/wire name of the role
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
            Role::Resolver => "resolver",
            Role::JuniorEngineer => "jeng",
        }
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Admin => "Admin",
            Role::Resolver => "Resolver",
            Role::JuniorEngineer => "Junior Engineer",
        }
    }

    /// Landing page after a successful login
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::JuniorEngineer => "/jeng",
            Role::Resolver => "/resolver",
            Role::Student => "/",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseError::UnknownRole(s.to_string()))
    }
}

/// Lifecycle of a complaint
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComplaintStatus {
    #[default]
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Resolved")]
    Resolved,
    #[serde(rename = "Rejected")]
    Rejected,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ComplaintStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseError::UnknownStatus(s.to_string()))
    }
}

/// A registered account
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique login name
    pub username: String,
    pub email: String,
    /// scrypt PHC string
    pub password_hash: String,
    pub role: Role,
    pub department: String,
    pub created_at: DateTime<Utc>,
}

/// Identity attached to an authenticated session
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub department: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            department: user.department.clone(),
        }
    }
}

/// Resolver a complaint has been handed to
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Assignment {
    pub resolver_id: Uuid,
    pub resolver_username: String,
    pub assigned_at: DateTime<Utc>,
}

/// A filed complaint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Complaint {
    pub id: Uuid,
    /// Sequential, human facing complaint number
    pub number: Seq,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: ComplaintStatus,
    /// User who filed the complaint
    pub user_id: Uuid,
    #[serde(default)]
    pub assignment: Option<Assignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    pub fn is_assigned_to(&self, user_id: Uuid) -> bool {
        self.assignment
            .as_ref()
            .is_some_and(|a| a.resolver_id == user_id)
    }
}

/// Severity of a flash message
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-shot message shown on the next rendered page
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}
