use serde::Deserialize;
use uuid::Uuid;

use crate::models::application::{ApplicationStatus, NewApplication};

/// Body of `POST /api/applications`. Every field is optional at the wire level so
/// that a missing field surfaces as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub applicant_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
}

/// Body of `PUT /api/applications/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl SubmitApplicationRequest {
    /// Names of required fields that are missing or blank, in wire order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("jobTitle", &self.job_title),
            ("company", &self.company),
            ("applicantName", &self.applicant_name),
            ("email", &self.email),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }

    /// Converts into a `NewApplication` owned by `owner`, or returns the missing
    /// required field names.
    pub fn into_new_application(self, owner: Uuid) -> Result<NewApplication, Vec<&'static str>> {
        let missing = self.missing_fields();
        let (Some(job_title), Some(company), Some(applicant_name), Some(email), Some(phone)) = (
            present(self.job_title),
            present(self.company),
            present(self.applicant_name),
            present(self.email),
            present(self.phone),
        ) else {
            return Err(missing);
        };

        Ok(NewApplication {
            user: owner,
            job_title,
            company,
            applicant_name,
            email,
            phone,
            cover_letter: present(self.cover_letter),
            resume: present(self.resume),
        })
    }
}

impl UpdateStatusRequest {
    /// Decodes a raw request body. An empty body means no status was supplied.
    pub fn from_body(body: &[u8]) -> Result<Self, String> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| format!("Invalid JSON body: {e}"))
    }

    /// `Ok(None)` when no status was supplied (blank counts as absent).
    pub fn parsed_status(&self) -> Result<Option<ApplicationStatus>, String> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<ApplicationStatus>()
                .map(Some)
                .map_err(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> SubmitApplicationRequest {
        SubmitApplicationRequest {
            job_title: Some("Engineer".into()),
            company: Some("Acme".into()),
            applicant_name: Some("Jo".into()),
            email: Some("jo@x.com".into()),
            phone: Some("555-1234".into()),
            cover_letter: None,
            resume: None,
        }
    }

    #[test]
    fn test_complete_request_has_no_missing_fields() {
        assert!(complete().missing_fields().is_empty());
    }

    #[test]
    fn test_blank_field_counts_as_missing() {
        let mut req = complete();
        req.company = Some("   ".into());
        req.phone = None;
        assert_eq!(req.missing_fields(), vec!["company", "phone"]);
    }

    #[test]
    fn test_into_new_application_sets_owner() {
        let owner = Uuid::new_v4();
        let new = complete().into_new_application(owner).unwrap();
        assert_eq!(new.user, owner);
        assert_eq!(new.job_title, "Engineer");
    }

    #[test]
    fn test_blank_optional_fields_become_none() {
        let mut req = complete();
        req.cover_letter = Some("".into());
        req.resume = Some("resumes/jo.pdf".into());
        let new = req.into_new_application(Uuid::new_v4()).unwrap();
        assert_eq!(new.cover_letter, None);
        assert_eq!(new.resume.as_deref(), Some("resumes/jo.pdf"));
    }

    #[test]
    fn test_deserializes_camel_case_body() {
        let req: SubmitApplicationRequest = serde_json::from_str(
            r#"{"jobTitle":"Engineer","company":"Acme","applicantName":"Jo","email":"jo@x.com","phone":"555-1234","coverLetter":"Hi"}"#,
        )
        .unwrap();
        assert!(req.missing_fields().is_empty());
        assert_eq!(req.cover_letter.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_empty_body_means_no_status() {
        let req = UpdateStatusRequest::from_body(b"").unwrap();
        assert_eq!(req.parsed_status(), Ok(None));
        let req = UpdateStatusRequest::from_body(b"  \n").unwrap();
        assert_eq!(req.parsed_status(), Ok(None));
    }

    #[test]
    fn test_body_decoded_or_rejected() {
        let req = UpdateStatusRequest::from_body(br#"{"status":"accepted"}"#).unwrap();
        assert_eq!(req.parsed_status(), Ok(Some(ApplicationStatus::Accepted)));
        assert!(UpdateStatusRequest::from_body(b"{status").is_err());
    }

    #[test]
    fn test_missing_fields_reported_on_conversion() {
        let mut req = complete();
        req.email = Some(" ".into());
        req.job_title = None;
        assert_eq!(
            req.into_new_application(Uuid::new_v4()).unwrap_err(),
            vec!["jobTitle", "email"]
        );
    }

    #[test]
    fn test_status_absent_or_blank_is_none() {
        assert_eq!(UpdateStatusRequest { status: None }.parsed_status(), Ok(None));
        assert_eq!(
            UpdateStatusRequest {
                status: Some("  ".into())
            }
            .parsed_status(),
            Ok(None)
        );
    }

    #[test]
    fn test_status_parsed_or_rejected() {
        assert_eq!(
            UpdateStatusRequest {
                status: Some("rejected".into())
            }
            .parsed_status(),
            Ok(Some(ApplicationStatus::Rejected))
        );
        assert!(UpdateStatusRequest {
            status: Some("hired".into())
        }
        .parsed_status()
        .is_err());
    }
}
