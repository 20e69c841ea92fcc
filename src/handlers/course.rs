// src/handlers/course.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        course::{
            Course, CourseDetail, CourseJoinRow, CourseListParams, CourseSummary,
            CreateCourseRequest, UpdateCourseRequest, rating_stats,
        },
        rating::RatingWithLearner,
    },
    utils::{html::clean_html, jwt::Claims},
};

const COURSE_COLUMNS: &str = "id, title, description, price, image, teaching_hours, skill_id, \
     trainer_id, created_at";

const COURSE_JOIN: &str = "SELECT c.id, c.title, c.description, c.price, c.image, \
     c.teaching_hours, c.skill_id, c.trainer_id, c.created_at, \
     u.name AS trainer_name, s.name AS skill_name \
     FROM courses c \
     JOIN users u ON c.trainer_id = u.id \
     JOIN skills s ON c.skill_id = s.id";

/// Helper struct for the course-detail query (adds the trainer's email).
#[derive(sqlx::FromRow)]
struct CourseDetailRow {
    id: i64,
    title: String,
    description: String,
    price: f64,
    image: Option<String>,
    teaching_hours: i32,
    skill_id: i64,
    trainer_id: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    trainer_name: String,
    trainer_email: String,
    skill_name: String,
}

async fn skill_exists(pool: &PgPool, skill_id: i64) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM skills WHERE id = $1")
        .bind(skill_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Decorates fetched course rows with the read-time aggregates.
///
/// Ratings and enrollments are loaded for the whole page in two queries and
/// folded per course in memory; the statistics are never stored, so every
/// entry point computes them the same way.
async fn decorate(pool: &PgPool, rows: Vec<CourseJoinRow>) -> Result<Vec<CourseSummary>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|c| c.id).collect();

    let rating_rows: Vec<(i64, i32)> =
        sqlx::query_as("SELECT course_id, rating FROM ratings WHERE course_id = ANY($1)")
            .bind(&ids)
            .fetch_all(pool)
            .await?;

    let enrollment_rows: Vec<(i64,)> =
        sqlx::query_as("SELECT course_id FROM enrollments WHERE course_id = ANY($1)")
            .bind(&ids)
            .fetch_all(pool)
            .await?;

    let mut ratings_by_course: HashMap<i64, Vec<i32>> = HashMap::new();
    for (course_id, rating) in rating_rows {
        ratings_by_course.entry(course_id).or_default().push(rating);
    }

    let mut enrollments_by_course: HashMap<i64, i64> = HashMap::new();
    for (course_id,) in enrollment_rows {
        *enrollments_by_course.entry(course_id).or_default() += 1;
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let ratings = ratings_by_course.remove(&row.id).unwrap_or_default();
            let enrolled = enrollments_by_course.get(&row.id).copied().unwrap_or(0);
            row.into_summary(&ratings, enrolled)
        })
        .collect())
}

/// Create a new course. Trainers only; the skill reference must resolve.
pub async fn create_course(
    State(pool): State<PgPool>,
    claims: Claims,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != "trainer" {
        return Err(AppError::Forbidden(
            "Only trainers can create courses".to_string(),
        ));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if !skill_exists(&pool, payload.skill).await? {
        return Err(AppError::BadRequest("Skill not found".to_string()));
    }

    let trainer_id = claims.sub.parse::<i64>().unwrap_or(0);
    let description = clean_html(&payload.description);
    let image = payload.image.filter(|i| !i.is_empty());

    let course = sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (title, description, price, image, teaching_hours, skill_id, trainer_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {COURSE_COLUMNS}"
    ))
    .bind(&payload.title)
    .bind(&description)
    .bind(payload.price)
    .bind(&image)
    .bind(payload.teaching_hours.unwrap_or(0))
    .bind(payload.skill)
    .bind(trainer_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create course: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Course created successfully", "course": course })),
    ))
}

/// List courses with optional search, skill filter and sort order.
///
/// `search` is an OR across title, description and trainer name. The
/// 'rated' sort cannot be pushed to SQL: the average is derived after the
/// fetch, so the sort happens here, after decoration.
pub async fn list_courses(
    State(pool): State<PgPool>,
    Query(params): Query<CourseListParams>,
) -> Result<impl IntoResponse, AppError> {
    let search_pattern = params.search.as_ref().map(|s| format!("%{}%", s));

    let order_sql = match params.sort_by.as_deref() {
        Some("price_asc") => "c.price ASC",
        Some("price_desc") => "c.price DESC",
        _ => "c.created_at DESC",
    };

    let rows: Vec<CourseJoinRow> = sqlx::query_as(&format!(
        "{COURSE_JOIN} \
         WHERE ($1::TEXT IS NULL OR c.title ILIKE $1 OR c.description ILIKE $1 OR u.name ILIKE $1) \
           AND ($2::BIGINT IS NULL OR c.skill_id = $2) \
         ORDER BY {order_sql}"
    ))
    .bind(&search_pattern)
    .bind(params.skill_id)
    .fetch_all(&pool)
    .await?;

    let mut courses = decorate(&pool, rows).await?;

    if params.sort_by.as_deref() == Some("rated") {
        courses.sort_by(|a, b| {
            b.average_rating
                .partial_cmp(&a.average_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    Ok(Json(courses))
}

/// Retrieve a single course with trainer contact, skill name, the full
/// review list and the derived statistics.
pub async fn get_course(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query_as::<_, CourseDetailRow>(
        "SELECT c.id, c.title, c.description, c.price, c.image, c.teaching_hours, \
         c.skill_id, c.trainer_id, c.created_at, \
         u.name AS trainer_name, u.email AS trainer_email, s.name AS skill_name \
         FROM courses c \
         JOIN users u ON c.trainer_id = u.id \
         JOIN skills s ON c.skill_id = s.id \
         WHERE c.id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let ratings = sqlx::query_as::<_, RatingWithLearner>(
        "SELECT r.id, r.learner_id, r.course_id, r.rating, r.comment, r.created_at, \
         u.name AS learner_name \
         FROM ratings r \
         JOIN users u ON r.learner_id = u.id \
         WHERE r.course_id = $1 \
         ORDER BY r.created_at DESC",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let enrollment_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await?;

    let scores: Vec<i32> = ratings.iter().map(|r| r.rating).collect();
    let (average_rating, review_count) = rating_stats(&scores);

    Ok(Json(CourseDetail {
        id: row.id,
        title: row.title,
        description: row.description,
        price: row.price,
        image: row.image,
        teaching_hours: row.teaching_hours,
        skill_id: row.skill_id,
        trainer_id: row.trainer_id,
        created_at: row.created_at,
        trainer_name: row.trainer_name,
        trainer_email: row.trainer_email,
        skill_name: row.skill_name,
        average_rating,
        review_count,
        enrollment_count,
        ratings,
    }))
}

/// List the calling trainer's own courses for the dashboard,
/// decorated with the same statistics as the public listing.
pub async fn list_trainer_courses(
    State(pool): State<PgPool>,
    claims: Claims,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != "trainer" {
        return Err(AppError::Forbidden(
            "Only trainers can view their course dashboard".to_string(),
        ));
    }

    let trainer_id = claims.sub.parse::<i64>().unwrap_or(0);

    let rows: Vec<CourseJoinRow> = sqlx::query_as(&format!(
        "{COURSE_JOIN} WHERE c.trainer_id = $1 ORDER BY c.created_at DESC"
    ))
    .bind(trainer_id)
    .fetch_all(&pool)
    .await?;

    let courses = decorate(&pool, rows).await?;

    Ok(Json(courses))
}

/// Update a course. Only the owning trainer may do this; omitted fields
/// keep their stored values, an empty image string clears the image.
pub async fn update_course(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut course = sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let caller_id = claims.sub.parse::<i64>().unwrap_or(0);
    if course.trainer_id != caller_id {
        return Err(AppError::Forbidden(
            "You are not authorized to update this course".to_string(),
        ));
    }

    if let Some(skill) = payload.skill {
        if !skill_exists(&pool, skill).await? {
            return Err(AppError::BadRequest("Skill not found".to_string()));
        }
    }

    let description_changed = payload.description.is_some();
    payload.merge_into(&mut course);
    if description_changed {
        course.description = clean_html(&course.description);
    }

    let course = sqlx::query_as::<_, Course>(&format!(
        "UPDATE courses SET title = $1, description = $2, price = $3, image = $4, \
         teaching_hours = $5, skill_id = $6 \
         WHERE id = $7 \
         RETURNING {COURSE_COLUMNS}"
    ))
    .bind(&course.title)
    .bind(&course.description)
    .bind(course.price)
    .bind(&course.image)
    .bind(course.teaching_hours)
    .bind(course.skill_id)
    .bind(id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update course: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(json!({ "message": "Course updated successfully", "course": course })))
}

/// Delete a course and its dependent rows.
///
/// The schema has no ON DELETE CASCADE: ratings and enrollments are removed
/// here, before the course row, inside one transaction, so a failure
/// partway leaves everything untouched.
pub async fn delete_course(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT trainer_id FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    let trainer_id = row
        .ok_or(AppError::NotFound("Course not found".to_string()))?
        .0;

    let caller_id = claims.sub.parse::<i64>().unwrap_or(0);
    if trainer_id != caller_id {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this course".to_string(),
        ));
    }

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!("Failed to start course deletion: {:?}", e);
        AppError::from(e)
    })?;

    sqlx::query("DELETE FROM ratings WHERE course_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM enrollments WHERE course_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Course deletion rolled back, related records remain: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(json!({ "message": "Course deleted successfully" })))
}
