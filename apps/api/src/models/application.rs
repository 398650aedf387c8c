use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::user::UserSummary;

/// Review state of an application. Any value may replace any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allowed: Vec<&str> = ApplicationStatus::ALL.iter().map(|s| s.as_str()).collect();
        write!(
            f,
            "Invalid status '{}', expected one of: {}",
            self.0,
            allowed.join(", ")
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A stored job application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: Uuid,
    /// Owning user id. Never rewritten after creation.
    pub user: Uuid,
    pub job_title: String,
    pub company: String,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new application. The store assigns id, status and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub user: Uuid,
    pub job_title: String,
    pub company: String,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct JobApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobApplicationRow> for JobApplication {
    type Error = anyhow::Error;

    fn try_from(row: JobApplicationRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ApplicationStatus>()
            .map_err(|e| anyhow!("row {} has corrupt status: {e}", row.id))?;
        Ok(JobApplication {
            id: row.id,
            user: row.user_id,
            job_title: row.job_title,
            company: row.company,
            applicant_name: row.applicant_name,
            email: row.email,
            phone: row.phone,
            cover_letter: row.cover_letter,
            resume: row.resume,
            status,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
        })
    }
}

/// Application row joined with its owner's name and email.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationWithOwnerRow {
    #[sqlx(flatten)]
    pub application: JobApplicationRow,
    pub owner_name: String,
    pub owner_email: String,
}

/// Admin listing shape: identical to `JobApplication` except `user` is the owner summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithOwner {
    pub id: Uuid,
    pub user: UserSummary,
    pub job_title: String,
    pub company: String,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationWithOwner {
    pub fn new(application: JobApplication, owner: UserSummary) -> Self {
        ApplicationWithOwner {
            id: application.id,
            user: owner,
            job_title: application.job_title,
            company: application.company,
            applicant_name: application.applicant_name,
            email: application.email,
            phone: application.phone,
            cover_letter: application.cover_letter,
            resume: application.resume,
            status: application.status,
            applied_at: application.applied_at,
            updated_at: application.updated_at,
        }
    }
}

impl TryFrom<ApplicationWithOwnerRow> for ApplicationWithOwner {
    type Error = anyhow::Error;

    fn try_from(row: ApplicationWithOwnerRow) -> Result<Self, Self::Error> {
        let owner = UserSummary {
            id: row.application.user_id,
            name: row.owner_name,
            email: row.owner_email,
        };
        Ok(ApplicationWithOwner::new(row.application.try_into()?, owner))
    }
}
