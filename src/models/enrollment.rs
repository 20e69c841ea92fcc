use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'enrollments' table: a learner's relationship to one
/// course. The (learner_id, course_id) pair is unique at the database level.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: i64,
    pub learner_id: i64,
    pub course_id: i64,
    /// 'active' or 'completed'.
    pub status: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

/// Flat row for an enrollment joined with its course, trainer and skill.
#[derive(Debug, FromRow)]
pub struct EnrollmentJoinRow {
    pub id: i64,
    pub learner_id: i64,
    pub course_id: i64,
    pub status: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: Option<String>,
    pub teaching_hours: i32,
    pub skill_id: i64,
    pub trainer_id: i64,
    pub course_created_at: chrono::DateTime<chrono::Utc>,
    pub trainer_name: String,
    pub skill_name: String,
}

/// Course data nested inside an enrollment response, so the profile card
/// can render without a second fetch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: Option<String>,
    pub teaching_hours: i32,
    pub skill_id: i64,
    pub trainer_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub trainer_name: String,
    pub skill_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentWithCourse {
    pub id: i64,
    pub learner_id: i64,
    pub course_id: i64,
    pub status: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub course: EnrolledCourse,
}

impl From<EnrollmentJoinRow> for EnrollmentWithCourse {
    fn from(row: EnrollmentJoinRow) -> Self {
        EnrollmentWithCourse {
            id: row.id,
            learner_id: row.learner_id,
            course_id: row.course_id,
            status: row.status,
            enrolled_at: row.enrolled_at,
            course: EnrolledCourse {
                id: row.course_id,
                title: row.title,
                description: row.description,
                price: row.price,
                image: row.image,
                teaching_hours: row.teaching_hours,
                skill_id: row.skill_id,
                trainer_id: row.trainer_id,
                created_at: row.course_created_at,
                trainer_name: row.trainer_name,
                skill_name: row.skill_name,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: i64,
}
