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
    models::rating::{CreateRatingRequest, RatingWithLearner},
    utils::{html::clean_html, jwt::Claims},
};

/// Submit a review for a course.
///
/// Learners only, and only with proof of enrollment. One review per
/// learner per course, backed by the unique constraint so concurrent
/// duplicates cannot slip through the pre-check.
pub async fn submit_rating(
    State(pool): State<PgPool>,
    claims: Claims,
    Json(payload): Json<CreateRatingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != "learner" {
        return Err(AppError::Forbidden(
            "Only learners can leave ratings".to_string(),
        ));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let learner_id = claims.sub.parse::<i64>().unwrap_or(0);

    let enrollment: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM enrollments WHERE learner_id = $1 AND course_id = $2",
    )
    .bind(learner_id)
    .bind(payload.course_id)
    .fetch_optional(&pool)
    .await?;

    if enrollment.is_none() {
        return Err(AppError::Forbidden(
            "You must be enrolled in this course to leave a review".to_string(),
        ));
    }

    let existing: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM ratings WHERE learner_id = $1 AND course_id = $2",
    )
    .bind(learner_id)
    .bind(payload.course_id)
    .fetch_optional(&pool)
    .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "You have already reviewed this course".to_string(),
        ));
    }

    let comment = payload
        .comment
        .filter(|c| !c.is_empty())
        .map(|c| clean_html(&c));

    let (rating_id,): (i64,) = sqlx::query_as(
        "INSERT INTO ratings (learner_id, course_id, rating, comment) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(learner_id)
    .bind(payload.course_id)
    .bind(payload.rating)
    .bind(&comment)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("You have already reviewed this course".to_string())
        } else {
            tracing::error!("Failed to create rating: {:?}", e);
            AppError::from(e)
        }
    })?;

    let rating = sqlx::query_as::<_, RatingWithLearner>(
        "SELECT r.id, r.learner_id, r.course_id, r.rating, r.comment, r.created_at, \
         u.name AS learner_name \
         FROM ratings r \
         JOIN users u ON r.learner_id = u.id \
         WHERE r.id = $1",
    )
    .bind(rating_id)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Review submitted successfully", "rating": rating })),
    ))
}

/// List all reviews for a course, newest first, with reviewer names.
pub async fn list_course_ratings(
    State(pool): State<PgPool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ratings = sqlx::query_as::<_, RatingWithLearner>(
        "SELECT r.id, r.learner_id, r.course_id, r.rating, r.comment, r.created_at, \
         u.name AS learner_name \
         FROM ratings r \
         JOIN users u ON r.learner_id = u.id \
         WHERE r.course_id = $1 \
         ORDER BY r.created_at DESC",
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(ratings))
}
