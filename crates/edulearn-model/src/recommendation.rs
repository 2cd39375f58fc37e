use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::course::Level;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecommendationRequest {
    /// Between 1 and 20.
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub include_enrolled: bool,
}

impl Default for RecommendationRequest {
    fn default() -> Self {
        Self {
            count: default_count(),
            include_enrolled: false,
        }
    }
}

fn default_count() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseRecommendation {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub level: Level,
    pub similarity_score: f64,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EssayGradingRequest {
    pub essay_text: String,
    #[serde(default)]
    pub rubric: Option<String>,
    #[serde(default = "default_max_score")]
    pub max_score: u32,
}

fn default_max_score() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EssayGrade {
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AiFeedback {
    pub id: Uuid,
    pub content_type: String,
    pub content_id: Option<Uuid>,
    pub feedback: String,
    pub score: Option<f64>,
    pub created_at: NaiveDateTime,
}
