// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Form validation module.
//!
//! Every check for a form runs and all failures are reported together, so a
//! re-rendered form can list each problem at once.

use std::fmt;
use std::sync::LazyLock;

use complaint_desk_common::{ComplaintStatus, Role};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::password_strength_errors;
use crate::config::PasswordRequirements;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_NAME_LENGTH: usize = 100;
const MAX_TITLE_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 5000;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("username regex"));

/// A single rejected form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Possible validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", join_messages(.0))]
    Fields(Vec<FieldError>),
}

impl ValidationError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ValidationError::Fields(errors) => errors,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.field_errors().iter().map(|e| e.message.clone()).collect()
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Accumulates failures for one form
#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    /// Trimmed value, recording `message` when it is empty
    fn required(&mut self, field: &'static str, value: &str, message: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.errors.push(FieldError::new(field, message));
        }
        value.to_string()
    }

    fn max_len(&mut self, field: &'static str, value: &str, max: usize, label: &str) {
        if value.chars().count() > max {
            self.errors.push(FieldError::new(
                field,
                format!("{label} cannot exceed {max} characters"),
            ));
        }
    }

    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn has(&self, field: &'static str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    fn finish<T>(self, value: T) -> ValidationResult<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError::Fields(self.errors))
        }
    }
}

/// Raw registration form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub role: String,
    pub department: String,
}

/// Registration that passed validation
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub department: String,
}

/// Validate an email address
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Validate a registration form
pub fn validate_registration(
    form: &RegisterForm,
    requirements: &PasswordRequirements,
) -> ValidationResult<Registration> {
    let mut check = Checker::default();

    let name = check.required("name", &form.name, "Name field is required");
    check.max_len("name", &name, MAX_NAME_LENGTH, "Name");

    let email = check.required("email", &form.email, "Email field is required");
    if !email.is_empty() && !is_valid_email(&email) {
        check.fail("email", "Email must be a valid email address");
    }

    let username = check.required("username", &form.username, "Username field is required");
    if !username.is_empty() && !USERNAME_REGEX.is_match(&username) {
        check.fail(
            "username",
            "Username may only contain letters, digits, dots, dashes and underscores",
        );
    }
    check.max_len("username", &username, MAX_NAME_LENGTH, "Username");

    // passwords are compared untrimmed
    if form.password.is_empty() {
        check.fail("password", "Password field is required");
    } else {
        for message in password_strength_errors(&form.password, requirements) {
            check.fail("password", message);
        }
    }
    if form.password2 != form.password {
        check.fail("password2", "Passwords do not match");
    }

    let role = match form.role.trim().parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            check.fail("role", "Role option is required");
            None
        },
    };

    let department = check.required("department", &form.department, "Department field is required");
    check.max_len("department", &department, MAX_NAME_LENGTH, "Department");

    match role {
        Some(role) => check.finish(Registration {
            name,
            username,
            email,
            password: form.password.clone(),
            role,
            department,
        }),
        None => Err(ValidationError::Fields(check.errors)),
    }
}

/// Raw complaint form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComplaintForm {
    pub title: String,
    pub description: String,
}

/// Complaint text that passed validation
#[derive(Debug, Clone)]
pub struct ComplaintDraft {
    pub title: String,
    pub description: String,
}

pub fn validate_complaint(form: &ComplaintForm) -> ValidationResult<ComplaintDraft> {
    let mut check = Checker::default();

    let title = check.required("title", &form.title, "Title is required");
    check.max_len("title", &title, MAX_TITLE_LENGTH, "Title");
    let description = check.required("description", &form.description, "Description is required");
    check.max_len("description", &description, MAX_DESCRIPTION_LENGTH, "Description");

    check.finish(ComplaintDraft { title, description })
}

/// Raw assignment form posted from the admin page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssignForm {
    #[serde(rename = "complaintID")]
    pub complaint_id: String,
    #[serde(rename = "resolverName")]
    pub resolver_name: String,
}

#[derive(Debug, Clone)]
pub struct AssignmentRequest {
    pub complaint_id: Uuid,
    pub resolver_username: String,
}

pub fn validate_assignment(form: &AssignForm) -> ValidationResult<AssignmentRequest> {
    let mut check = Checker::default();

    let raw_id = check.required("complaintID", &form.complaint_id, "Complaint ID is required");
    let complaint_id = parse_complaint_id(&mut check, "complaintID", &raw_id);
    let resolver_username = check.required("resolverName", &form.resolver_name, "Resolver name is required");

    check.finish(AssignmentRequest {
        complaint_id,
        resolver_username,
    })
}

/// Raw status update form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusForm {
    #[serde(rename = "complaintID")]
    pub complaint_id: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub complaint_id: Uuid,
    pub status: ComplaintStatus,
}

pub fn validate_status_change(form: &StatusForm) -> ValidationResult<StatusChange> {
    let mut check = Checker::default();

    let raw_id = check.required("complaintID", &form.complaint_id, "Complaint ID is required");
    let complaint_id = parse_complaint_id(&mut check, "complaintID", &raw_id);

    let raw_status = check.required("status", &form.status, "Status is required");
    // forms post the exact labels
    let status = ComplaintStatus::ALL
        .into_iter()
        .find(|status| status.label() == raw_status)
        .unwrap_or_else(|| {
            if !raw_status.is_empty() {
                check.fail("status", "Status is not a recognised complaint status");
            }
            ComplaintStatus::default()
        });

    check.finish(StatusChange {
        complaint_id,
        status,
    })
}

fn parse_complaint_id(check: &mut Checker, field: &'static str, raw: &str) -> Uuid {
    if check.has(field) {
        return Uuid::nil();
    }
    Uuid::parse_str(raw).unwrap_or_else(|_| {
        check.fail(field, "Complaint ID is invalid");
        Uuid::nil()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegisterForm {
        RegisterForm {
            name: "Asha Verma".to_string(),
            username: "asha".to_string(),
            email: "asha@example.edu".to_string(),
            password: "correct horse".to_string(),
            password2: "correct horse".to_string(),
            role: "student".to_string(),
            department: "Civil".to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let reg = validate_registration(&valid_registration(), &PasswordRequirements::default())
            .unwrap();
        assert_eq!(reg.role, Role::Student);
        assert_eq!(reg.username, "asha");
    }

    #[test]
    fn test_empty_registration_reports_every_field() {
        let err = validate_registration(&RegisterForm::default(), &PasswordRequirements::default())
            .unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                "Name field is required",
                "Email field is required",
                "Username field is required",
                "Password field is required",
                "Role option is required",
                "Department field is required",
            ]
        );
    }

    #[test]
    fn test_registration_field_rules() {
        let mut form = valid_registration();
        form.email = "not-an-email".to_string();
        form.password2 = "different".to_string();
        form.role = "superuser".to_string();

        let err = validate_registration(&form, &PasswordRequirements::default()).unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["email", "password2", "role"]);
        assert!(err
            .messages()
            .contains(&"Email must be a valid email address".to_string()));
        assert!(err.messages().contains(&"Passwords do not match".to_string()));
    }

    #[test]
    fn test_registration_password_strength() {
        let mut form = valid_registration();
        form.password = "short".to_string();
        form.password2 = "short".to_string();

        let err = validate_registration(&form, &PasswordRequirements::default()).unwrap_err();
        assert_eq!(err.messages(), vec!["Password must be at least 8 characters"]);
    }

    #[test]
    fn test_registration_trims_fields() {
        let mut form = valid_registration();
        form.name = "  Asha Verma ".to_string();
        form.role = " jeng ".to_string();
        form.department = "   ".to_string();

        let err = validate_registration(&form, &PasswordRequirements::default()).unwrap_err();
        assert_eq!(err.messages(), vec!["Department field is required"]);

        form.department = "Civil".to_string();
        let reg = validate_registration(&form, &PasswordRequirements::default()).unwrap();
        assert_eq!(reg.name, "Asha Verma");
        assert_eq!(reg.role, Role::JuniorEngineer);
    }

    #[test]
    fn test_complaint_validation() {
        let err = validate_complaint(&ComplaintForm::default()).unwrap_err();
        assert_eq!(err.messages(), vec!["Title is required", "Description is required"]);
        assert_eq!(err.to_string(), "Title is required; Description is required");

        let long = ComplaintForm {
            title: "x".repeat(MAX_TITLE_LENGTH + 1),
            description: "fine".to_string(),
        };
        assert!(validate_complaint(&long).is_err());

        let ok = validate_complaint(&ComplaintForm {
            title: " Broken fan ".to_string(),
            description: "Room 204".to_string(),
        })
        .unwrap();
        assert_eq!(ok.title, "Broken fan");
    }

    #[test]
    fn test_assignment_validation() {
        let err = validate_assignment(&AssignForm::default()).unwrap_err();
        assert_eq!(
            err.messages(),
            vec!["Complaint ID is required", "Resolver name is required"]
        );

        let err = validate_assignment(&AssignForm {
            complaint_id: "42".to_string(),
            resolver_name: "ravi".to_string(),
        })
        .unwrap_err();
        assert_eq!(err.messages(), vec!["Complaint ID is invalid"]);

        let id = Uuid::new_v4();
        let req = validate_assignment(&AssignForm {
            complaint_id: id.to_string(),
            resolver_name: "ravi".to_string(),
        })
        .unwrap();
        assert_eq!(req.complaint_id, id);
    }

    #[test]
    fn test_status_validation() {
        let id = Uuid::new_v4();
        let change = validate_status_change(&StatusForm {
            complaint_id: id.to_string(),
            status: "In Progress".to_string(),
        })
        .unwrap();
        assert_eq!(change.status, ComplaintStatus::InProgress);

        let err = validate_status_change(&StatusForm {
            complaint_id: id.to_string(),
            status: "Escalated".to_string(),
        })
        .unwrap_err();
        assert_eq!(
            err.messages(),
            vec!["Status is not a recognised complaint status"]
        );

        let err = validate_status_change(&StatusForm {
            complaint_id: id.to_string(),
            status: "resolved".to_string(),
        })
        .unwrap_err();
        assert_eq!(
            err.messages(),
            vec!["Status is not a recognised complaint status"]
        );
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("asha@example.edu"));
        assert!(!is_valid_email("asha@"));
        assert!(!is_valid_email(&format!("{}@example.edu", "a".repeat(MAX_EMAIL_LENGTH))));
    }
}
