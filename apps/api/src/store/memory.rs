use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::hash_token;
use crate::models::application::{
    ApplicationStatus, ApplicationWithOwner, JobApplication, NewApplication,
};
use crate::models::user::{Role, User, UserSummary};
use crate::store::ApplicationStore;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    token_index: HashMap<String, Uuid>,
    /// Insertion order; doubles as the tie-break for equal `applied_at`.
    applications: Vec<JobApplication>,
}

/// In-process store for local development and tests. Contents die with the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user reachable through `token`.
    pub async fn insert_user(
        &self,
        name: &str,
        email: &str,
        role: Role,
        token: &str,
    ) -> Result<User> {
        let token_hash = hash_token(token);
        let mut inner = self.inner.write().await;
        if inner.token_index.contains_key(&token_hash) {
            bail!("token already assigned to another user");
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };
        inner.token_index.insert(token_hash, user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }
}

/// Newest first; ties resolved by later insertion first.
fn newest_first(applications: &[JobApplication]) -> Vec<JobApplication> {
    let mut sorted: Vec<JobApplication> = applications.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
    sorted
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn create_application(&self, new: NewApplication) -> Result<JobApplication> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&new.user) {
            bail!("unknown owner {}", new.user);
        }

        let now = Utc::now();
        let application = JobApplication {
            id: Uuid::new_v4(),
            user: new.user,
            job_title: new.job_title,
            company: new.company,
            applicant_name: new.applicant_name,
            email: new.email,
            phone: new.phone,
            cover_letter: new.cover_letter,
            resume: new.resume,
            status: ApplicationStatus::default(),
            applied_at: now,
            updated_at: now,
        };
        inner.applications.push(application.clone());
        Ok(application)
    }

    async fn find_applications_by_owner(&self, user_id: Uuid) -> Result<Vec<JobApplication>> {
        let inner = self.inner.read().await;
        let owned: Vec<JobApplication> = inner
            .applications
            .iter()
            .filter(|a| a.user == user_id)
            .cloned()
            .collect();
        Ok(newest_first(&owned))
    }

    async fn find_all_applications(&self) -> Result<Vec<ApplicationWithOwner>> {
        let inner = self.inner.read().await;
        newest_first(&inner.applications)
            .into_iter()
            .map(|application| -> Result<ApplicationWithOwner> {
                let owner = inner
                    .users
                    .get(&application.user)
                    .ok_or_else(|| anyhow!("application {} has no owner", application.id))?;
                let summary = UserSummary {
                    id: owner.id,
                    name: owner.name.clone(),
                    email: owner.email.clone(),
                };
                Ok(ApplicationWithOwner::new(application, summary))
            })
            .collect()
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<JobApplication>> {
        let inner = self.inner.read().await;
        Ok(inner.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn save_application(&self, application: &JobApplication) -> Result<JobApplication> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .applications
            .iter_mut()
            .find(|a| a.id == application.id)
            .ok_or_else(|| anyhow!("application {} vanished before save", application.id))?;

        *stored = JobApplication {
            user: stored.user,
            applied_at: stored.applied_at,
            updated_at: Utc::now(),
            ..application.clone()
        };
        Ok(stored.clone())
    }

    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .token_index
            .get(token_hash)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }
}
