// ============================
// complaint-desk-backend/src/storage.rs
// ============================
//! Storage abstraction with a flat-file JSON document implementation.
//!
//! Three collections live under the data directory: `users.json`,
//! `complaints.json` and `counters.json`. Every mutation is written to a
//! temporary file and renamed into place while the collection lock is held,
//! and memory is only updated once the write succeeded.
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use complaint_desk_common::{
    Assignment, Complaint, ComplaintStatus, Role, Seq, User, COMPLAINT_SEQUENCE,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs as tokio_fs, sync::RwLock};
use uuid::Uuid;

use crate::error::AppError;

const USERS_FILE: &str = "users.json";
const COMPLAINTS_FILE: &str = "complaints.json";
const COUNTERS_FILE: &str = "counters.json";

/// Fields supplied when filing a complaint
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub user_id: Uuid,
}

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a user; fails with `UsernameTaken` on a duplicate username
    async fn create_user(&self, user: User) -> Result<User, AppError>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Every user, ordered by username
    async fn users(&self) -> Result<Vec<User>, AppError>;

    /// All users holding a role, ordered by username
    async fn users_with_role(&self, role: Role) -> Result<Vec<User>, AppError>;

    /// Atomically increment a named counter and return the new value (first value is 1)
    async fn next_sequence(&self, name: &str) -> Result<Seq, AppError>;

    /// File a complaint, numbering it from the complaint sequence
    async fn insert_complaint(&self, new: NewComplaint) -> Result<Complaint, AppError>;

    async fn complaint(&self, id: Uuid) -> Result<Option<Complaint>, AppError>;

    /// Every complaint, ordered by number
    async fn complaints(&self) -> Result<Vec<Complaint>, AppError>;

    async fn complaints_by_user(&self, user_id: Uuid) -> Result<Vec<Complaint>, AppError>;

    async fn complaints_assigned_to(&self, user_id: Uuid) -> Result<Vec<Complaint>, AppError>;

    async fn update_complaint_status(
        &self,
        id: Uuid,
        status: ComplaintStatus,
    ) -> Result<Complaint, AppError>;

    /// Set (or replace) the resolver a complaint is assigned to
    async fn assign_complaint(
        &self,
        id: Uuid,
        assignment: Assignment,
    ) -> Result<Complaint, AppError>;
}

#[derive(Default)]
struct Documents {
    users: Vec<User>,
    complaints: Vec<Complaint>,
    counters: BTreeMap<String, Seq>,
}

/// Flat-file implementation of the Storage trait
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    docs: Arc<RwLock<Documents>>,
}

impl FlatFileStorage {
    /// Open (or create) a data directory and load its collections
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let mut complaints: Vec<Complaint> = load_collection(&root.join(COMPLAINTS_FILE))?;
        complaints.sort_by_key(|c| c.number);

        let docs = Documents {
            users: load_collection(&root.join(USERS_FILE))?,
            complaints,
            counters: load_collection(&root.join(COUNTERS_FILE))?,
        };

        tracing::info!(
            root = %root.display(),
            users = docs.users.len(),
            complaints = docs.complaints.len(),
            "storage opened"
        );

        Ok(Self {
            root,
            docs: Arc::new(RwLock::new(docs)),
        })
    }

    async fn persist<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<(), AppError> {
        let path = self.root.join(file);
        let tmp = self.root.join(format!("{file}.tmp"));

        let json = serde_json::to_vec_pretty(value)?;
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Compute and persist the next value of a counter. Caller holds the write lock.
    async fn bump_counter(&self, docs: &mut Documents, name: &str) -> Result<Seq, AppError> {
        let next = docs.counters.get(name).copied().unwrap_or(0) + 1;

        let mut counters = docs.counters.clone();
        counters.insert(name.to_string(), next);
        self.persist(COUNTERS_FILE, &counters).await?;

        docs.counters = counters;
        Ok(next)
    }

    /// Apply `change` to one complaint and persist the collection
    async fn modify_complaint<F>(&self, id: Uuid, change: F) -> Result<Complaint, AppError>
    where
        F: FnOnce(&mut Complaint) + Send,
    {
        let mut docs = self.docs.write().await;

        let index = docs
            .complaints
            .iter()
            .position(|c| c.id == id)
            .ok_or(AppError::ComplaintNotFound(id))?;

        let mut complaints = docs.complaints.clone();
        let complaint = &mut complaints[index];
        change(complaint);
        complaint.updated_at = Utc::now();
        let updated = complaint.clone();

        self.persist(COMPLAINTS_FILE, &complaints).await?;
        docs.complaints = complaints;

        Ok(updated)
    }
}

fn load_collection<T: DeserializeOwned + Default>(path: &Path) -> anyhow::Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("corrupt collection {}: {e}", path.display()))
}

#[async_trait]
impl Storage for FlatFileStorage {
    async fn create_user(&self, user: User) -> Result<User, AppError> {
        let mut docs = self.docs.write().await;

        if docs.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::UsernameTaken(user.username));
        }

        let mut users = docs.users.clone();
        users.push(user.clone());
        self.persist(USERS_FILE, &users).await?;
        docs.users = users;

        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let docs = self.docs.read().await;
        Ok(docs.users.iter().find(|u| u.username == username).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let docs = self.docs.read().await;
        Ok(docs.users.iter().find(|u| u.id == id).cloned())
    }

    async fn users(&self) -> Result<Vec<User>, AppError> {
        let docs = self.docs.read().await;
        let mut users = docs.users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn users_with_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let docs = self.docs.read().await;
        let mut users: Vec<User> = docs.users.iter().filter(|u| u.role == role).cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn next_sequence(&self, name: &str) -> Result<Seq, AppError> {
        let mut docs = self.docs.write().await;
        self.bump_counter(&mut docs, name).await
    }

    async fn insert_complaint(&self, new: NewComplaint) -> Result<Complaint, AppError> {
        let mut docs = self.docs.write().await;

        let number = self.bump_counter(&mut docs, COMPLAINT_SEQUENCE).await?;
        let now = Utc::now();
        let complaint = Complaint {
            id: Uuid::new_v4(),
            number,
            title: new.title,
            description: new.description,
            status: ComplaintStatus::Pending,
            user_id: new.user_id,
            assignment: None,
            created_at: now,
            updated_at: now,
        };

        let mut complaints = docs.complaints.clone();
        complaints.push(complaint.clone());
        self.persist(COMPLAINTS_FILE, &complaints).await?;
        docs.complaints = complaints;

        Ok(complaint)
    }

    async fn complaint(&self, id: Uuid) -> Result<Option<Complaint>, AppError> {
        let docs = self.docs.read().await;
        Ok(docs.complaints.iter().find(|c| c.id == id).cloned())
    }

    async fn complaints(&self) -> Result<Vec<Complaint>, AppError> {
        Ok(self.docs.read().await.complaints.clone())
    }

    async fn complaints_by_user(&self, user_id: Uuid) -> Result<Vec<Complaint>, AppError> {
        let docs = self.docs.read().await;
        Ok(docs
            .complaints
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn complaints_assigned_to(&self, user_id: Uuid) -> Result<Vec<Complaint>, AppError> {
        let docs = self.docs.read().await;
        Ok(docs
            .complaints
            .iter()
            .filter(|c| c.is_assigned_to(user_id))
            .cloned()
            .collect())
    }

    async fn update_complaint_status(
        &self,
        id: Uuid,
        status: ComplaintStatus,
    ) -> Result<Complaint, AppError> {
        self.modify_complaint(id, |c| c.status = status).await
    }

    async fn assign_complaint(
        &self,
        id: Uuid,
        assignment: Assignment,
    ) -> Result<Complaint, AppError> {
        self.modify_complaint(id, move |c| c.assignment = Some(assignment))
            .await
    }
}
