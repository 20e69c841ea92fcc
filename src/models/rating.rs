use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'ratings' table: one review per learner per course,
/// unique at the database level. Read-only once created.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i64,
    pub learner_id: i64,
    pub course_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Review joined with the reviewer's name, for course-page rendering.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RatingWithLearner {
    pub id: i64,
    pub learner_id: i64,
    pub course_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub learner_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingRequest {
    pub course_id: i64,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,
    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters."))]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_enforced() {
        for bad in [0, 6, -1] {
            let req = CreateRatingRequest {
                course_id: 1,
                rating: bad,
                comment: None,
            };
            assert!(req.validate().is_err(), "rating {} should be rejected", bad);
        }
        for good in 1..=5 {
            let req = CreateRatingRequest {
                course_id: 1,
                rating: good,
                comment: None,
            };
            assert!(req.validate().is_ok());
        }
    }
}
