//! Role rules for the complaint workflow.
use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use complaint_desk_common::{Assignment, Complaint, ComplaintStatus, Role, SessionUser, User};
use thiserror::Error;
use uuid::Uuid;

/// Department label for complaints whose filer cannot be resolved
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// Statuses a resolver is allowed to set
pub const RESOLVER_STATUSES: [ComplaintStatus; 2] =
    [ComplaintStatus::InProgress, ComplaintStatus::Resolved];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Not authorized")]
    NotAuthorized,

    #[error("No resolver named {0}")]
    ResolverNotFound(String),

    #[error("{0} is not a resolver")]
    NotAResolver(String),
}

/// Decide whether `actor` may move `complaint` to `status`.
///
/// Admins may set any status. Resolvers may only mark complaints assigned to
/// them as in progress or resolved.
pub fn authorize_status_change(
    actor: &SessionUser,
    complaint: &Complaint,
    status: ComplaintStatus,
) -> Result<(), WorkflowError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Resolver
            if RESOLVER_STATUSES.contains(&status) && complaint.is_assigned_to(actor.id) =>
        {
            Ok(())
        },
        _ => Err(WorkflowError::NotAuthorized),
    }
}

/// Build the assignment record for handing a complaint to `resolver`
pub fn plan_assignment(
    actor: &SessionUser,
    resolver_name: &str,
    resolver: Option<&User>,
) -> Result<Assignment, WorkflowError> {
    if actor.role != Role::Admin {
        return Err(WorkflowError::NotAuthorized);
    }
    let resolver = resolver.ok_or_else(|| WorkflowError::ResolverNotFound(resolver_name.to_string()))?;
    if resolver.role != Role::Resolver {
        return Err(WorkflowError::NotAResolver(resolver.username.clone()));
    }
    Ok(Assignment {
        resolver_id: resolver.id,
        resolver_username: resolver.username.clone(),
        assigned_at: Utc::now(),
    })
}

/// Complaints filed from one department
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentGroup {
    pub department: String,
    pub complaints: Vec<Complaint>,
}

/// Group complaints by the filer's department. Groups are ordered by
/// department name and complaints by number.
pub fn group_by_department(complaints: Vec<Complaint>, users: &[User]) -> Vec<DepartmentGroup> {
    let departments: HashMap<Uuid, &str> = users
        .iter()
        .map(|u| (u.id, u.department.as_str()))
        .collect();

    let mut groups: BTreeMap<String, Vec<Complaint>> = BTreeMap::new();
    for complaint in complaints {
        let department = departments
            .get(&complaint.user_id)
            .copied()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(UNKNOWN_DEPARTMENT);
        groups.entry(department.to_string()).or_default().push(complaint);
    }

    groups
        .into_iter()
        .map(|(department, mut complaints)| {
            complaints.sort_by_key(|c| c.number);
            DepartmentGroup {
                department,
                complaints,
            }
        })
        .collect()
}
