//! Persistence for users and job applications.
//!
//! `AppState` carries an `Arc<dyn ApplicationStore>`, chosen at startup from
//! `Config::store_backend`. Handlers and service functions never see the backend.

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::application::{ApplicationWithOwner, JobApplication, NewApplication};
use crate::models::user::User;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Persists a new application with a generated id, `pending` status and the
    /// current time as `applied_at`.
    async fn create_application(&self, new: NewApplication) -> Result<JobApplication>;

    /// All applications owned by `user_id`, newest first.
    async fn find_applications_by_owner(&self, user_id: Uuid) -> Result<Vec<JobApplication>>;

    /// Every application with its owner's summary, newest first.
    async fn find_all_applications(&self) -> Result<Vec<ApplicationWithOwner>>;

    async fn find_application(&self, id: Uuid) -> Result<Option<JobApplication>>;

    /// Re-persists an existing application. Owner and `applied_at` are never
    /// rewritten; `updated_at` is refreshed.
    async fn save_application(&self, application: &JobApplication) -> Result<JobApplication>;

    /// Resolves a user from the SHA-256 hex digest of their API token.
    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>>;
}
