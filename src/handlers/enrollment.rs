use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    error::{AppError, is_unique_violation},
    models::enrollment::{EnrollRequest, EnrollmentJoinRow, EnrollmentWithCourse},
    utils::jwt::Claims,
};

const ENROLLMENT_JOIN: &str = "SELECT e.id, e.learner_id, e.course_id, e.status, e.enrolled_at, \
     c.title, c.description, c.price, c.image, c.teaching_hours, c.skill_id, c.trainer_id, \
     c.created_at AS course_created_at, \
     u.name AS trainer_name, s.name AS skill_name \
     FROM enrollments e \
     JOIN courses c ON e.course_id = c.id \
     JOIN users u ON c.trainer_id = u.id \
     JOIN skills s ON c.skill_id = s.id";

/// Enroll the caller in a course.
///
/// The pre-checks give friendly messages; the real guarantee is the
/// UNIQUE (learner_id, course_id) constraint, which turns a concurrent
/// duplicate insert into a 409 rather than a second row. The owning
/// trainer cannot enroll in their own course.
pub async fn enroll(
    State(pool): State<PgPool>,
    claims: Claims,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse, AppError> {
    let learner_id = claims.sub.parse::<i64>().unwrap_or(0);

    let course: Option<(i64,)> = sqlx::query_as("SELECT trainer_id FROM courses WHERE id = $1")
        .bind(payload.course_id)
        .fetch_optional(&pool)
        .await?;

    let trainer_id = course
        .ok_or(AppError::NotFound("Course not found".to_string()))?
        .0;

    if trainer_id == learner_id {
        return Err(AppError::BadRequest(
            "Trainers cannot enroll in their own courses".to_string(),
        ));
    }

    let already_enrolled: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM enrollments WHERE learner_id = $1 AND course_id = $2",
    )
    .bind(learner_id)
    .bind(payload.course_id)
    .fetch_optional(&pool)
    .await?;

    if already_enrolled.is_some() {
        return Err(AppError::Conflict(
            "You are already enrolled in this course".to_string(),
        ));
    }

    let (enrollment_id,): (i64,) = sqlx::query_as(
        "INSERT INTO enrollments (learner_id, course_id, status) \
         VALUES ($1, $2, 'active') \
         RETURNING id",
    )
    .bind(learner_id)
    .bind(payload.course_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("You are already enrolled in this course".to_string())
        } else {
            tracing::error!("Failed to create enrollment: {:?}", e);
            AppError::from(e)
        }
    })?;

    // Return the enrollment joined with course, trainer and skill so the
    // client does not need a second fetch.
    let row = sqlx::query_as::<_, EnrollmentJoinRow>(&format!(
        "{ENROLLMENT_JOIN} WHERE e.id = $1"
    ))
    .bind(enrollment_id)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Enrollment successful",
            "enrollment": EnrollmentWithCourse::from(row),
        })),
    ))
}

/// List the caller's enrollments, newest first, each joined with its
/// course (and that course's trainer and skill).
pub async fn list_user_enrollments(
    State(pool): State<PgPool>,
    claims: Claims,
) -> Result<impl IntoResponse, AppError> {
    let learner_id = claims.sub.parse::<i64>().unwrap_or(0);

    let rows: Vec<EnrollmentJoinRow> = sqlx::query_as(&format!(
        "{ENROLLMENT_JOIN} WHERE e.learner_id = $1 ORDER BY e.enrolled_at DESC"
    ))
    .bind(learner_id)
    .fetch_all(&pool)
    .await?;

    let enrollments: Vec<EnrollmentWithCourse> =
        rows.into_iter().map(EnrollmentWithCourse::from).collect();

    Ok(Json(enrollments))
}
