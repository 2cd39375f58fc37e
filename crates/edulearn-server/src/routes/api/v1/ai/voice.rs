use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v1::ai::error::AiError;
use crate::routes::api::v1::courses::is_visible;
use crate::routes::error::ValidationErrors;
use crate::user::ExtractUser;
use axum::extract::{FromRequest, Multipart, Request};
use axum::response::{IntoResponse, Response};
use axum::routing::{Router, post};
use axum::{Extension, Json};
use edulearn_core::ai::voice::{attach_audio, execute_command};
use edulearn_core::openai::{CallConfig, transcribe as transcribe_audio};
use edulearn_core::tts::error::TTSError;
use edulearn_core::tts::{lesson_speech_text, synthesize_to_media};
use edulearn_db::course::{course, lesson};
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_model::voice::{
    AudioUrl, LessonAudioRequest, TextToSpeechRequest, Transcription, VoiceCommandRequest, VoiceCommandResult,
};
use http::header;
use protect_axum::protect;
use utoipa::ToSchema;

const AUDIO_FIELD: &str = "audio";
const DEFAULT_FILE_NAME: &str = "audio.wav";

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/transcribe", post(transcribe))
        .route("/text_to_speech", post(text_to_speech))
        .route("/lesson_audio", post(lesson_audio))
        .route("/command", post(command))
}

/// `multipart/form-data` body carrying a recording.
#[derive(ToSchema)]
#[allow(dead_code)]
pub(crate) struct AudioForm {
    #[schema(value_type = String, format = Binary)]
    audio: Vec<u8>,
}

pub(crate) struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

async fn read_audio(mut multipart: Multipart) -> Result<Upload, AiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or(DEFAULT_FILE_NAME).to_owned();
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            break;
        }
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(ValidationErrors::field(AUDIO_FIELD, "No audio file provided.").into())
}

async fn transcribe_upload(app_config: &AppConfig, upload: Upload) -> Result<String, AiError> {
    tracing::debug!(file = %upload.file_name, bytes = upload.bytes.len(), "transcribing upload");
    let text = transcribe_audio(
        app_config.llm_config(),
        &CallConfig::default(),
        upload.file_name,
        upload.bytes,
    )
    .await?;
    Ok(text)
}

/// A voice command, typed as JSON or recorded as a multipart upload.
pub(crate) enum CommandInput {
    Text(String),
    Audio(Upload),
}

impl<S> FromRequest<S> for CommandInput
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));
        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            let upload = read_audio(multipart).await.map_err(IntoResponse::into_response)?;
            Ok(Self::Audio(upload))
        } else {
            let Json(request) = Json::<VoiceCommandRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self::Text(request.text))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/voice/transcribe",
    request_body(content = AudioForm, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Transcribed text", body = Transcription),
        (status = BAD_REQUEST, description = "No audio file provided"),
        (status = SERVICE_UNAVAILABLE, description = "Transcription is not configured"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn transcribe(
    ExtractUser(_user): ExtractUser,
    Extension(app_config): Extension<AppConfig>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AiError> {
    let upload = read_audio(multipart).await?;
    let text = transcribe_upload(&app_config, upload).await?;
    Ok(Json(Transcription { text }))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/voice/text_to_speech",
    request_body = TextToSpeechRequest,
    responses(
        (status = OK, description = "Url of the synthesized mp3", body = AudioUrl),
        (status = BAD_REQUEST, description = "No text provided"),
        (status = SERVICE_UNAVAILABLE, description = "Text to speech is not configured"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn text_to_speech(
    ExtractUser(_user): ExtractUser,
    Extension(app_config): Extension<AppConfig>,
    Json(request): Json<TextToSpeechRequest>,
) -> Result<impl IntoResponse, AiError> {
    if request.text.trim().is_empty() {
        return Err(ValidationErrors::field("text", "No text provided.").into());
    }
    let tts_config = app_config.tts_config().ok_or(TTSError::NotConfigured)?;
    tracing::debug!(language = %request.language, "synthesizing text");
    let audio_url = synthesize_to_media(tts_config, app_config.media(), &request.text).await?;
    Ok(Json(AudioUrl { audio_url }))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/voice/lesson_audio",
    request_body = LessonAudioRequest,
    responses(
        (status = OK, description = "Url of the lesson read aloud", body = AudioUrl),
        (status = NOT_FOUND, description = "Unknown lesson or not visible to the caller"),
        (status = SERVICE_UNAVAILABLE, description = "Text to speech is not configured"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn lesson_audio(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Json(request): Json<LessonAudioRequest>,
) -> Result<impl IntoResponse, AiError> {
    let found = lesson::Query::find_by_id(&conn, request.lesson_id)
        .await?
        .ok_or(AiError::NotFound)?;
    let owner = course::Query::find_by_id(&conn, found.course_id)
        .await?
        .filter(|owner| is_visible(owner, Some(&user)))
        .ok_or(AiError::NotFound)?;
    if !found.is_published && owner.instructor_id != user.id {
        return Err(AiError::NotFound);
    }

    let tts_config = app_config.tts_config().ok_or(TTSError::NotConfigured)?;
    tracing::debug!(lesson = %found.id, language = %request.language, "reading lesson aloud");
    let text = lesson_speech_text(&found.title, &found.content);
    let audio_url = synthesize_to_media(tts_config, app_config.media(), &text).await?;
    Ok(Json(AudioUrl { audio_url }))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/voice/command",
    request_body(
        content = VoiceCommandRequest,
        description = "A typed command as JSON, or a multipart form with an `audio` recording",
    ),
    responses(
        (status = OK, description = "Result of the routed command", body = VoiceCommandResult),
        (status = BAD_REQUEST, description = "No audio file or text provided"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn command(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    input: CommandInput,
) -> Result<impl IntoResponse, AiError> {
    let (text, spoken) = match input {
        CommandInput::Text(text) => (text, false),
        CommandInput::Audio(upload) => (transcribe_upload(&app_config, upload).await?, true),
    };
    if text.trim().is_empty() {
        return Err(ValidationErrors::field("text", "No audio file or text provided.").into());
    }

    let result = execute_command(&conn, app_config.llm_config(), &user, &text).await?;
    let result = if spoken {
        attach_audio(result, app_config.tts_config(), app_config.media()).await
    } else {
        result
    };
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, bearer};
    use edulearn_core::ai::chat::FALLBACK_REPLY;
    use edulearn_db::course::enrollment;
    use edulearn_test_helpers::fixtures::{create_course, create_lesson, create_user};
    use http::{Method, StatusCode};
    use serde_json::json;
    use test_log::test;
    use uuid::Uuid;

    #[test(tokio::test)]
    async fn test_text_commands() {
        let app = TestApp::new().await;
        let instructor = create_user(&app.conn, "host").await.unwrap();
        let user = create_user(&app.conn, "speaker").await.unwrap();
        let course = create_course(&app.conn, instructor.id, "Ownership Basics", true).await.unwrap();
        let token = bearer(&app, user.id);
        let command = |text: &'static str| json!({ "text": text });

        let (status, found) = app
            .request(
                Method::POST,
                "/api/v1/ai/voice/command",
                Some(&token),
                Some(command("Find course ownership")),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["action"], "search_courses");
        assert_eq!(found["message"], "I found 1 courses matching 'ownership'");
        assert_eq!(found["success"], true);
        assert_eq!(found["speak_response"], true);
        assert!(found.get("audio_url").is_none());

        let (_, enrolled) = app
            .request(Method::POST, "/api/v1/ai/voice/command", Some(&token), Some(command("my courses")))
            .await;
        assert_eq!(enrolled["message"], "You are not enrolled in any courses yet");

        enrollment::Mutation::enroll(&app.conn, user.id, course.id).await.unwrap();
        let (_, enrolled) = app
            .request(Method::POST, "/api/v1/ai/voice/command", Some(&token), Some(command("my courses")))
            .await;
        assert_eq!(enrolled["message"], "You are enrolled in 1 courses");

        let (_, resumed) = app
            .request(
                Method::POST,
                "/api/v1/ai/voice/command",
                Some(&token),
                Some(command("continue learning")),
            )
            .await;
        assert_eq!(resumed["message"], "You don't have any lessons in progress");

        let (_, answered) = app
            .request(
                Method::POST,
                "/api/v1/ai/voice/command",
                Some(&token),
                Some(command("What is a lifetime?")),
            )
            .await;
        assert_eq!(answered["action"], "ai_response");
        assert_eq!(answered["message"], FALLBACK_REPLY);

        let (status, _) = app
            .request(Method::POST, "/api/v1/ai/voice/command", Some(&token), Some(command(" ")))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test(tokio::test)]
    async fn test_audio_needs_configured_services() {
        let app = TestApp::new().await;
        let instructor = create_user(&app.conn, "narrator").await.unwrap();
        let user = create_user(&app.conn, "listener").await.unwrap();
        let course = create_course(&app.conn, instructor.id, "Slices", true).await.unwrap();
        let lesson = create_lesson(&app.conn, course.id, 1, true).await.unwrap();
        let draft = create_lesson(&app.conn, course.id, 2, false).await.unwrap();
        let token = bearer(&app, user.id);

        let (status, body) = app.upload("/api/v1/ai/voice/transcribe", &token, "file", b"RIFF").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["audio"][0], "No audio file provided.");
        let (status, _) = app.upload("/api/v1/ai/voice/transcribe", &token, "audio", b"RIFF").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let (status, _) = app.upload("/api/v1/ai/voice/command", &token, "audio", b"RIFF").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = app
            .request(
                Method::POST,
                "/api/v1/ai/voice/text_to_speech",
                Some(&token),
                Some(json!({"text": ""})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = app
            .request(
                Method::POST,
                "/api/v1/ai/voice/text_to_speech",
                Some(&token),
                Some(json!({"text": "Hello", "language": "de"})),
            )
            .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        for (lesson_id, expected) in [
            (Uuid::new_v4(), StatusCode::NOT_FOUND),
            (draft.id, StatusCode::NOT_FOUND),
            (lesson.id, StatusCode::SERVICE_UNAVAILABLE),
        ] {
            let (status, _) = app
                .request(
                    Method::POST,
                    "/api/v1/ai/voice/lesson_audio",
                    Some(&token),
                    Some(json!({ "lesson_id": lesson_id })),
                )
                .await;
            assert_eq!(status, expected);
        }
    }
}
