use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'skills' table: flat category tags that group courses.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Slim `{id, name}` shape for the course-filter dropdown.
#[derive(Debug, Serialize, FromRow)]
pub struct SkillOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSkillRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters."))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Description must be between 1 and 2000 characters."
    ))]
    pub description: String,
}

/// Omitted fields keep their stored values.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSkillRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters."))]
    pub name: Option<String>,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Description must be between 1 and 2000 characters."
    ))]
    pub description: Option<String>,
}

/// A user's tracked progress on one skill ('user_skills' table).
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSkill {
    pub id: i64,
    pub user_id: i64,
    pub skill_id: i64,
    pub status: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Tracked skill joined with its catalog entry, for profile rendering.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSkillEntry {
    pub id: i64,
    pub user_id: i64,
    pub skill_id: i64,
    pub skill_name: String,
    pub status: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackProgressRequest {
    pub skill_id: i64,
    #[validate(custom(function = validate_progress_status))]
    pub status: String,
}

fn validate_progress_status(status: &str) -> Result<(), validator::ValidationError> {
    match status {
        "pending" | "in_progress" | "completed" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_status")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_status_is_whitelisted() {
        let req = TrackProgressRequest {
            skill_id: 1,
            status: "abandoned".to_string(),
        };
        assert!(req.validate().is_err());

        let req = TrackProgressRequest {
            skill_id: 1,
            status: "in_progress".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
