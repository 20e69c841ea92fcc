use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{UpdateProfileRequest, UserProfile},
    utils::{html::clean_html, jwt::Claims},
};

/// Get the current user's profile.
pub async fn get_profile(
    State(pool): State<PgPool>,
    claims: Claims,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let profile = sqlx::query_as::<_, UserProfile>(
        "SELECT id, name, email, role, is_verified, bio, years_of_experience \
         FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(profile))
}

/// Update the current user's profile (name, bio, years of experience).
/// Omitted fields keep their stored values. Role changes are rejected.
pub async fn update_profile(
    State(pool): State<PgPool>,
    claims: Claims,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if let Some(role) = &payload.role {
        if *role != claims.role {
            return Err(AppError::Forbidden(
                "Role cannot be changed via this endpoint".to_string(),
            ));
        }
    }

    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let existing = sqlx::query_as::<_, UserProfile>(
        "SELECT id, name, email, role, is_verified, bio, years_of_experience \
         FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    let name = payload.name.unwrap_or(existing.name);
    let bio = match payload.bio {
        Some(bio) => Some(clean_html(&bio)),
        None => existing.bio,
    };
    let years = payload.years_of_experience.or(existing.years_of_experience);

    let profile = sqlx::query_as::<_, UserProfile>(
        "UPDATE users SET name = $1, bio = $2, years_of_experience = $3 \
         WHERE id = $4 \
         RETURNING id, name, email, role, is_verified, bio, years_of_experience",
    )
    .bind(&name)
    .bind(&bio)
    .bind(years)
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update profile: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": profile,
    })))
}
