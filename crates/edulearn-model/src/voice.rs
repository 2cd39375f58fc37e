use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transcription {
    pub text: String,
}

fn default_language() -> String {
    "en".to_owned()
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TextToSpeechRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LessonAudioRequest {
    pub lesson_id: Uuid,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AudioUrl {
    pub audio_url: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VoiceCommandRequest {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VoiceAction {
    SearchCourses,
    ListEnrollments,
    ContinueLearning,
    AiResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VoiceCommandResult {
    pub success: bool,
    pub action: VoiceAction,
    pub data: Value,
    pub message: String,
    pub speak_response: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}
