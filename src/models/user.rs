// src/models/user.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Passcodes are exactly six digits; anything else is rejected before the
/// database is consulted.
static OTP_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{6}$").unwrap());

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    pub name: String,

    /// Unique email, the login identifier.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// User role: 'learner' or 'trainer'.
    pub role: String,

    /// Learners are verified at signup; trainers flip to true once they
    /// confirm the one-time passcode.
    pub is_verified: bool,

    pub bio: Option<String>,
    pub years_of_experience: Option<i32>,

    /// Pending one-time passcode for trainer verification.
    #[serde(skip)]
    pub otp_code: Option<String>,
    #[serde(skip)]
    pub otp_expires: Option<chrono::DateTime<chrono::Utc>>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The user shape returned to clients (auth responses and profile reads).
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    pub bio: Option<String>,
    pub years_of_experience: Option<i32>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            is_verified: user.is_verified,
            bio: user.bio.clone(),
            years_of_experience: user.years_of_experience,
        }
    }
}

/// DTO for signup. `role` decides between the learner flow (instant
/// verification + token) and the trainer flow (passcode verification).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters."))]
    pub name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
    #[validate(custom(function = validate_role))]
    pub role: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for the trainer passcode confirmation step.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(regex(path = *OTP_CODE_RE, message = "Verification code must be 6 digits."))]
    pub otp: String,
}

/// DTO for profile updates. Omitted fields keep their stored values.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters."))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters."))]
    pub bio: Option<String>,
    #[validate(range(min = 0, max = 80))]
    pub years_of_experience: Option<i32>,
    /// Accepted only when it matches the caller's current role.
    pub role: Option<String>,
}

fn validate_role(role: &str) -> Result<(), validator::ValidationError> {
    if role != "learner" && role != "trainer" {
        return Err(validator::ValidationError::new("invalid_role"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_rejects_unknown_role() {
        let req = SignupRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "password123".to_string(),
            role: "admin".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn otp_format_is_enforced() {
        let req = VerifyOtpRequest {
            email: "ada@example.com".to_string(),
            otp: "12345".to_string(),
        };
        assert!(req.validate().is_err());

        let req = VerifyOtpRequest {
            email: "ada@example.com".to_string(),
            otp: "123456".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
