use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::application::{
    ApplicationStatus, ApplicationWithOwner, ApplicationWithOwnerRow, JobApplication,
    JobApplicationRow, NewApplication,
};
use crate::models::user::{User, UserRow};
use crate::store::ApplicationStore;

const APPLICATION_COLUMNS: &str = "id, user_id, job_title, company, applicant_name, email, \
     phone, cover_letter, resume, status, applied_at, updated_at";

/// PostgreSQL-backed store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn create_application(&self, new: NewApplication) -> Result<JobApplication> {
        let row = sqlx::query_as::<_, JobApplicationRow>(&format!(
            r#"
            INSERT INTO job_applications
                (id, user_id, job_title, company, applicant_name, email, phone,
                 cover_letter, resume, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.user)
        .bind(&new.job_title)
        .bind(&new.company)
        .bind(&new.applicant_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.cover_letter)
        .bind(&new.resume)
        .bind(ApplicationStatus::default().as_str())
        .fetch_one(&self.pool)
        .await?;

        info!(application_id = %row.id, user_id = %row.user_id, "Inserted job application");
        row.try_into()
    }

    async fn find_applications_by_owner(&self, user_id: Uuid) -> Result<Vec<JobApplication>> {
        sqlx::query_as::<_, JobApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications \
             WHERE user_id = $1 ORDER BY applied_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(JobApplication::try_from)
        .collect()
    }

    async fn find_all_applications(&self) -> Result<Vec<ApplicationWithOwner>> {
        sqlx::query_as::<_, ApplicationWithOwnerRow>(
            r#"
            SELECT a.id, a.user_id, a.job_title, a.company, a.applicant_name, a.email,
                   a.phone, a.cover_letter, a.resume, a.status, a.applied_at, a.updated_at,
                   u.name AS owner_name, u.email AS owner_email
            FROM job_applications a
            JOIN users u ON u.id = a.user_id
            ORDER BY a.applied_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(ApplicationWithOwner::try_from)
        .collect()
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<JobApplication>> {
        sqlx::query_as::<_, JobApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(JobApplication::try_from)
        .transpose()
    }

    async fn save_application(&self, application: &JobApplication) -> Result<JobApplication> {
        // user_id and applied_at stay out of the SET list: both are immutable.
        let row = sqlx::query_as::<_, JobApplicationRow>(&format!(
            r#"
            UPDATE job_applications
            SET job_title = $2, company = $3, applicant_name = $4, email = $5, phone = $6,
                cover_letter = $7, resume = $8, status = $9, updated_at = now()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(application.id)
        .bind(&application.job_title)
        .bind(&application.company)
        .bind(&application.applicant_name)
        .bind(&application.email)
        .bind(&application.phone)
        .bind(&application.cover_letter)
        .bind(&application.resume)
        .bind(application.status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| anyhow!("application {} vanished before save", application.id))?;

        info!(application_id = %row.id, status = %row.status, "Saved job application");
        row.try_into()
    }

    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, created_at FROM users WHERE api_token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?
        .map(User::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_token;
    use crate::db::create_pool;

    // Needs a disposable database:
    // DATABASE_URL=postgres://... cargo test -- --ignored
    async fn connect() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        PgStore::new(create_pool(&url, 2).await.unwrap())
    }

    async fn insert_user(store: &PgStore, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, name, email, role, api_token_hash) VALUES ($1, $2, $3, 'user', $4)",
        )
        .bind(id)
        .bind(name)
        .bind(format!("{id}@example.com"))
        .bind(hash_token(&id.to_string()))
        .execute(&store.pool)
        .await
        .unwrap();
        id
    }

    fn new_application(user: Uuid) -> NewApplication {
        NewApplication {
            user,
            job_title: "Engineer".into(),
            company: "Acme".into(),
            applicant_name: "Jo".into(),
            email: "jo@x.com".into(),
            phone: "555-1234".into(),
            cover_letter: None,
            resume: None,
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_save_never_rewrites_owner_or_applied_at() {
        let store = connect().await;
        let owner = insert_user(&store, "Owner").await;
        let created = store.create_application(new_application(owner)).await.unwrap();
        assert_eq!(created.status, ApplicationStatus::Pending);

        let mut tampered = created.clone();
        tampered.user = insert_user(&store, "Other").await;
        tampered.applied_at = created.applied_at - chrono::Duration::days(30);
        tampered.status = ApplicationStatus::Accepted;

        let saved = store.save_application(&tampered).await.unwrap();
        assert_eq!(saved.user, owner);
        assert_eq!(saved.applied_at, created.applied_at);
        assert_eq!(saved.status, ApplicationStatus::Accepted);

        let reread = store.find_application(created.id).await.unwrap().unwrap();
        assert_eq!(reread, saved);
    }

    #[tokio::test]
    #[ignore]
    async fn test_find_all_joins_owner_and_token_lookup() {
        let store = connect().await;
        let owner = insert_user(&store, "Joined Owner").await;
        let created = store.create_application(new_application(owner)).await.unwrap();

        let all = store.find_all_applications().await.unwrap();
        let listed = all.iter().find(|a| a.id == created.id).unwrap();
        assert_eq!(listed.user.id, owner);
        assert_eq!(listed.user.name, "Joined Owner");
        assert_eq!(listed.user.email, format!("{owner}@example.com"));

        let user = store
            .find_user_by_token_hash(&hash_token(&owner.to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, owner);
    }
}
