use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::skill::{
        CreateSkillRequest, Skill, SkillOption, TrackProgressRequest, UpdateSkillRequest,
        UserSkill, UserSkillEntry,
    },
    utils::jwt::Claims,
};

/// Create a new skill category. Trainers only; names are unique.
pub async fn create_skill(
    State(pool): State<PgPool>,
    claims: Claims,
    Json(payload): Json<CreateSkillRequest>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != "trainer" {
        return Err(AppError::Forbidden(
            "Only trainers can create skills".to_string(),
        ));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let skill = sqlx::query_as::<_, Skill>(
        "INSERT INTO skills (name, description) VALUES ($1, $2) \
         RETURNING id, name, description, created_at",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Skill '{}' already exists", payload.name))
        } else {
            tracing::error!("Failed to create skill: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Skill created successfully", "skill": skill })),
    ))
}

/// List all skills as `{id, name}` pairs for the course filters.
/// Oldest first, so the dropdown order is stable.
pub async fn list_skills(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let skills =
        sqlx::query_as::<_, SkillOption>("SELECT id, name FROM skills ORDER BY created_at ASC")
            .fetch_all(&pool)
            .await?;

    Ok(Json(skills))
}

/// Retrieve a single skill by ID.
pub async fn get_skill(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let skill = sqlx::query_as::<_, Skill>(
        "SELECT id, name, description, created_at FROM skills WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Skill not found".to_string()))?;

    Ok(Json(skill))
}

/// Update a skill's name or description. Trainers only.
pub async fn update_skill(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSkillRequest>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != "trainer" {
        return Err(AppError::Forbidden(
            "Only trainers can update skills".to_string(),
        ));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let existing = sqlx::query_as::<_, Skill>(
        "SELECT id, name, description, created_at FROM skills WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Skill not found".to_string()))?;

    let name = payload.name.unwrap_or(existing.name);
    let description = payload.description.unwrap_or(existing.description);

    let skill = sqlx::query_as::<_, Skill>(
        "UPDATE skills SET name = $1, description = $2 WHERE id = $3 \
         RETURNING id, name, description, created_at",
    )
    .bind(&name)
    .bind(&description)
    .bind(id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Skill '{}' already exists", name))
        } else {
            tracing::error!("Failed to update skill: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok(Json(json!({ "message": "Skill updated successfully", "skill": skill })))
}

/// Delete a skill. Trainers only. A skill still referenced by courses
/// cannot be removed; progress-tracking rows go with it.
pub async fn delete_skill(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != "trainer" {
        return Err(AppError::Forbidden(
            "Only trainers can delete skills".to_string(),
        ));
    }

    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM skills WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Skill not found".to_string()));
    }

    let course_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE skill_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await?;
    if course_count > 0 {
        return Err(AppError::Conflict(
            "Skill is in use by existing courses".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM user_skills WHERE skill_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM skills WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(json!({ "message": "Skill deleted successfully" })))
}

/// Record the caller's progress on a skill. The (user_id, skill_id) unique
/// constraint makes this an upsert rather than a check-then-insert.
pub async fn track_progress(
    State(pool): State<PgPool>,
    claims: Claims,
    Json(payload): Json<TrackProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let skill_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM skills WHERE id = $1")
        .bind(payload.skill_id)
        .fetch_optional(&pool)
        .await?;
    if skill_exists.is_none() {
        return Err(AppError::BadRequest("Skill not found".to_string()));
    }

    let user_skill = sqlx::query_as::<_, UserSkill>(
        "INSERT INTO user_skills (user_id, skill_id, status) VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, skill_id) \
         DO UPDATE SET status = EXCLUDED.status, updated_at = NOW() \
         RETURNING id, user_id, skill_id, status, updated_at",
    )
    .bind(user_id)
    .bind(payload.skill_id)
    .bind(&payload.status)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({
        "message": "Skill progress updated",
        "userSkill": user_skill,
    })))
}

/// List a user's tracked skills, joined with the skill names.
pub async fn list_user_skills(
    State(pool): State<PgPool>,
    _claims: Claims,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let entries = sqlx::query_as::<_, UserSkillEntry>(
        "SELECT us.id, us.user_id, us.skill_id, s.name AS skill_name, us.status, us.updated_at \
         FROM user_skills us \
         JOIN skills s ON us.skill_id = s.id \
         WHERE us.user_id = $1 \
         ORDER BY us.updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(entries))
}
