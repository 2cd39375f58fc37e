use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::quiz::Quiz;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent: Option<Uuid>,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCategory {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseListItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub thumbnail: Option<String>,
    pub level: Level,
    pub duration: String,
    pub instructor_name: String,
    pub category_name: Option<String>,
    pub lesson_count: u64,
    pub is_featured: bool,
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseDetail {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub short_description: String,
    pub category: Option<Category>,
    pub instructor: Uuid,
    pub instructor_name: String,
    pub level: Level,
    pub duration: String,
    pub prerequisites: String,
    pub learning_objectives: Vec<String>,
    pub thumbnail: Option<String>,
    pub preview_video: Option<String>,
    pub is_published: bool,
    pub is_featured: bool,
    pub lessons: Vec<Lesson>,
    pub enrollment_count: u64,
    pub is_enrolled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    /// Category slug.
    #[serde(default)]
    pub category: Option<String>,
    pub level: Level,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub prerequisites: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub preview_video: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category: Option<String>,
    pub level: Option<Level>,
    pub duration: Option<String>,
    pub prerequisites: Option<String>,
    pub learning_objectives: Option<Vec<String>>,
    pub thumbnail: Option<String>,
    pub preview_video: Option<String>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub order: i32,
    pub content: String,
    pub video_url: Option<String>,
    /// Minutes.
    pub duration: i32,
    pub is_published: bool,
    pub is_free_preview: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quizzes: Vec<Quiz>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewLesson {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub duration: i32,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_free_preview: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LessonChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub is_published: Option<bool>,
    pub is_free_preview: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    pub course: Uuid,
    pub course_title: String,
    pub status: EnrollmentStatus,
    /// Percentage of completed published lessons.
    pub progress: f64,
    pub enrolled_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewEnrollment {
    pub course: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EnrollmentChanges {
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LessonProgress {
    pub id: Uuid,
    pub lesson: Uuid,
    pub lesson_title: String,
    pub status: ProgressStatus,
    /// Seconds.
    pub time_spent: i32,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub last_accessed_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProgressChanges {
    pub status: Option<ProgressStatus>,
    pub time_spent: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkComplete {
    #[schema(example = "Lesson marked as completed.")]
    pub detail: String,
    pub progress: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_level_names() {
        assert_eq!(serde_json::to_string(&Level::Intermediate).unwrap(), r#""intermediate""#);
        assert_eq!(Level::from_str("advanced").unwrap(), Level::Advanced);
        assert!(Level::from_str("expert").is_err());
    }

    #[test]
    fn test_progress_status_names() {
        assert_eq!(ProgressStatus::NotStarted.to_string(), "not_started");
        assert_eq!(
            serde_json::from_str::<ProgressStatus>(r#""in_progress""#).unwrap(),
            ProgressStatus::InProgress
        );
    }
}
