// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

use crate::models::rating::RatingWithLearner;

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Cover image: a URL or an inline data URL. NULL when unset.
    pub image: Option<String>,
    pub teaching_hours: i32,
    pub skill_id: i64,
    pub trainer_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Course row joined with trainer and skill names, as fetched for listings.
#[derive(Debug, FromRow)]
pub struct CourseJoinRow {
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

impl CourseJoinRow {
    /// Decorate the row with read-time aggregates. The average is computed
    /// here, not in SQL, because the 'rated' sort needs it after the fetch.
    pub fn into_summary(self, ratings: &[i32], enrollment_count: i64) -> CourseSummary {
        let (average_rating, review_count) = rating_stats(ratings);
        CourseSummary {
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            image: self.image,
            teaching_hours: self.teaching_hours,
            skill_id: self.skill_id,
            trainer_id: self.trainer_id,
            created_at: self.created_at,
            trainer_name: self.trainer_name,
            skill_name: self.skill_name,
            average_rating,
            review_count,
            enrollment_count,
        }
    }
}

/// Listing shape: course plus joined names and derived statistics.
/// The statistics are never stored; they are recomputed on every read so
/// list, detail and trainer-dashboard views always agree.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
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
    pub average_rating: f64,
    pub review_count: i64,
    pub enrollment_count: i64,
}

/// Detail shape: everything the course page needs in one response,
/// including the full review list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
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
    pub trainer_email: String,
    pub skill_name: String,
    pub average_rating: f64,
    pub review_count: i64,
    pub enrollment_count: i64,
    pub ratings: Vec<RatingWithLearner>,
}

/// DTO for creating a course. `skill` carries the skill id, matching the
/// shape the web client sends.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters."))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 20000,
        message = "Description must be between 1 and 20000 characters."
    ))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than zero."))]
    pub price: f64,
    pub skill: i64,
    #[validate(length(max = 100000), custom(function = validate_image))]
    pub image: Option<String>,
    #[validate(range(min = 0, message = "Teaching hours must not be negative."))]
    pub teaching_hours: Option<i32>,
}

/// DTO for updating a course. Any subset of fields; omitted fields keep
/// their stored values.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters."))]
    pub title: Option<String>,
    #[validate(length(
        min = 1,
        max = 20000,
        message = "Description must be between 1 and 20000 characters."
    ))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than zero."))]
    pub price: Option<f64>,
    pub skill: Option<i64>,
    #[validate(length(max = 100000), custom(function = validate_image))]
    pub image: Option<String>,
    #[validate(range(min = 0, message = "Teaching hours must not be negative."))]
    pub teaching_hours: Option<i32>,
}

impl UpdateCourseRequest {
    /// Merge the patch into an existing course.
    ///
    /// An omitted field keeps the stored value. The image field is special:
    /// an empty string clears it (images can be intentionally removed),
    /// which is why omission and emptiness must stay distinguishable.
    pub fn merge_into(self, course: &mut Course) {
        if let Some(title) = self.title {
            course.title = title;
        }
        if let Some(description) = self.description {
            course.description = description;
        }
        if let Some(price) = self.price {
            course.price = price;
        }
        if let Some(skill) = self.skill {
            course.skill_id = skill;
        }
        if let Some(image) = self.image {
            course.image = if image.is_empty() { None } else { Some(image) };
        }
        if let Some(hours) = self.teaching_hours {
            course.teaching_hours = hours;
        }
    }
}

/// Query parameters for the course listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListParams {
    /// Case-insensitive substring match over title, description or trainer name.
    pub search: Option<String>,
    /// Restrict to one skill category.
    pub skill_id: Option<i64>,
    /// 'newest' (default), 'price_asc', 'price_desc' or 'rated'.
    pub sort_by: Option<String>,
}

/// Read-time rating statistics: (average rounded to one decimal, count).
/// Returns (0.0, 0) for a course with no ratings.
pub fn rating_stats(ratings: &[i32]) -> (f64, i64) {
    let count = ratings.len() as i64;
    if count == 0 {
        return (0.0, 0);
    }
    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    let average = sum as f64 / count as f64;
    ((average * 10.0).round() / 10.0, count)
}

/// Accepts absolute URLs (including data URLs). The empty string is allowed:
/// it is the "clear this image" sentinel on update.
fn validate_image(image: &str) -> Result<(), validator::ValidationError> {
    if image.is_empty() {
        return Ok(());
    }
    if Url::parse(image).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_course() -> Course {
        Course {
            id: 1,
            title: "UX 101".to_string(),
            description: "Design fundamentals".to_string(),
            price: 399.0,
            image: Some("https://example.com/ux.png".to_string()),
            teaching_hours: 12,
            skill_id: 1,
            trainer_id: 7,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn stats_empty_is_zero() {
        assert_eq!(rating_stats(&[]), (0.0, 0));
    }

    #[test]
    fn stats_single_rating() {
        assert_eq!(rating_stats(&[5]), (5.0, 1));
    }

    #[test]
    fn stats_rounds_to_one_decimal() {
        // 11 / 3 = 3.666... -> 3.7
        assert_eq!(rating_stats(&[3, 4, 4]), (3.7, 3));
        // 9 / 2 = 4.5
        assert_eq!(rating_stats(&[4, 5]), (4.5, 2));
        // 10 / 3 = 3.333... -> 3.3
        assert_eq!(rating_stats(&[3, 3, 4]), (3.3, 3));
    }

    #[test]
    fn merge_preserves_omitted_fields() {
        let mut course = sample_course();
        let patch = UpdateCourseRequest {
            title: Some("UX 102".to_string()),
            description: None,
            price: None,
            skill: None,
            image: None,
            teaching_hours: None,
        };
        patch.merge_into(&mut course);
        assert_eq!(course.title, "UX 102");
        assert_eq!(course.description, "Design fundamentals");
        assert_eq!(course.price, 399.0);
        assert_eq!(course.image.as_deref(), Some("https://example.com/ux.png"));
    }

    #[test]
    fn merge_empty_image_clears_it() {
        let mut course = sample_course();
        let patch = UpdateCourseRequest {
            title: None,
            description: None,
            price: None,
            skill: None,
            image: Some(String::new()),
            teaching_hours: None,
        };
        patch.merge_into(&mut course);
        assert_eq!(course.image, None);
    }

    #[test]
    fn merge_replaces_image_when_given() {
        let mut course = sample_course();
        let patch = UpdateCourseRequest {
            title: None,
            description: None,
            price: None,
            skill: None,
            image: Some("https://example.com/new.png".to_string()),
            teaching_hours: Some(20),
        };
        patch.merge_into(&mut course);
        assert_eq!(course.image.as_deref(), Some("https://example.com/new.png"));
        assert_eq!(course.teaching_hours, 20);
    }

    #[test]
    fn create_request_rejects_zero_price() {
        let req = CreateCourseRequest {
            title: "UX 101".to_string(),
            description: "Design fundamentals".to_string(),
            price: 0.0,
            skill: 1,
            image: None,
            teaching_hours: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_rejects_bad_image_url() {
        let req = CreateCourseRequest {
            title: "UX 101".to_string(),
            description: "Design fundamentals".to_string(),
            price: 399.0,
            skill: 1,
            image: Some("not a url".to_string()),
            teaching_hours: None,
        };
        assert!(req.validate().is_err());
    }
}
