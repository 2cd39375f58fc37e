use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::course::ProgressStatus;
use crate::quiz::QuestionType;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QuizStatistics {
    pub avg_score: Option<f64>,
    pub avg_time: Option<f64>,
    pub attempt_count: u64,
    pub max_score: Option<f64>,
    pub min_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionStatistics {
    pub question_id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub correct_percentage: f64,
    pub avg_score: f64,
    pub attempt_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResponseSummary {
    pub question_id: Uuid,
    pub question_text: String,
    pub is_correct: bool,
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttemptSummary {
    pub attempt_id: Uuid,
    pub score: f64,
    pub time_taken: i32,
    pub completed_at: Option<NaiveDateTime>,
    pub responses: Vec<ResponseSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizAnalysis {
    pub quiz_id: Uuid,
    pub quiz_title: String,
    pub statistics: QuizStatistics,
    pub question_statistics: Vec<QuestionStatistics>,
    pub user_attempt: Option<AttemptSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoursePerformance {
    pub course_id: Uuid,
    pub course_title: String,
    pub progress: f64,
    pub completed_lessons: u64,
    pub total_lessons: u64,
    pub avg_quiz_score: f64,
    pub strengths: Vec<QuestionType>,
    pub weaknesses: Vec<QuestionType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LearningResource {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackReport {
    pub assessment: String,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub resources: Vec<LearningResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PersonalizedFeedback {
    Report {
        user_id: Uuid,
        course_data: Vec<CoursePerformance>,
        feedback: FeedbackReport,
    },
    Empty {
        user_id: Uuid,
        message: String,
        recommendations: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GapIssue {
    pub question_id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub score: f64,
    pub max_score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KnowledgeGap {
    pub lesson_id: Uuid,
    pub lesson_title: String,
    pub course_id: Uuid,
    pub course_title: String,
    pub issue_count: usize,
    pub issues: Vec<GapIssue>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StudyPlanRequest {
    #[serde(default)]
    pub course_id: Option<Uuid>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Normal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlannedLesson {
    pub lesson_id: Uuid,
    pub lesson_title: String,
    pub priority: Priority,
    pub status: ProgressStatus,
    pub duration: i32,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoursePlan {
    pub course_id: Uuid,
    pub course_title: String,
    pub progress: f64,
    pub remaining_lessons: usize,
    pub lessons: Vec<PlannedLesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanActivity {
    pub course: String,
    pub lesson: String,
    /// Minutes.
    pub duration: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanDay {
    pub day: String,
    pub activities: Vec<PlanActivity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanWeek {
    pub week: u32,
    pub focus: String,
    pub days: Vec<PlanDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudySchedule {
    pub overview: String,
    pub recommendations: Vec<String>,
    pub weekly_plan: Vec<PlanWeek>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum StudyPlan {
    Plan {
        user_id: Uuid,
        target_date: Option<NaiveDate>,
        days_remaining: Option<i64>,
        courses: Vec<CoursePlan>,
        study_plan: StudySchedule,
    },
    Empty {
        user_id: Uuid,
        message: String,
        plan: Vec<CoursePlan>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Normal);
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), r#""high""#);
    }

    #[test]
    fn test_feedback_report_without_resources() {
        let report: FeedbackReport =
            serde_json::from_str(r#"{"assessment": "Good", "recommendations": ["Keep going"]}"#).unwrap();
        assert!(report.resources.is_empty());
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn test_resource_type_field() {
        let resource: LearningResource =
            serde_json::from_str(r#"{"title": "Intro", "description": "Video", "type": "video"}"#).unwrap();
        assert_eq!(resource.kind, "video");
    }
}
