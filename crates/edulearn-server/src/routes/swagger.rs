use super::api;
use super::global;

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder};
use utoipa::{Modify, OpenApi, openapi::security::SecurityScheme};
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

struct SecurityAddon;

#[derive(OpenApi)]
#[openapi(
    info(title = "EduLearn API"),
    paths(
        api::v1::status::get_status,
        api::v1::users::register,
        api::v1::users::list_users,
        api::v1::users::get_user,
        api::v1::users::update_user,
        api::v1::users::delete_user,
        api::v1::users::get_me,
        api::v1::users::update_me,
        api::v1::users::activities::list_activities,
        api::v1::users::activities::create_activity,
        api::v1::users::activities::activity_stats,
        api::v1::users::activities::get_activity,
        api::v1::users::activities::delete_activity,
        api::v1::users::preferences::list_preferences,
        api::v1::users::preferences::create_preference,
        api::v1::users::preferences::get_preference,
        api::v1::users::preferences::update_preference,
        api::v1::users::preferences::delete_preference,
        api::v1::users::token::obtain_token,
        api::v1::users::token::refresh_token,
        api::v1::users::token::verify_token,
        api::v1::courses::list_courses,
        api::v1::courses::create_course,
        api::v1::courses::get_course,
        api::v1::courses::update_course,
        api::v1::courses::delete_course,
        api::v1::courses::enroll,
        api::v1::courses::my_courses,
        api::v1::courses::teaching,
        api::v1::courses::list_categories,
        api::v1::courses::get_category,
        api::v1::courses::create_category,
        api::v1::courses::attempts::list_attempts,
        api::v1::courses::attempts::get_attempt,
        api::v1::courses::enrollments::list_enrollments,
        api::v1::courses::enrollments::create_enrollment,
        api::v1::courses::enrollments::get_enrollment,
        api::v1::courses::enrollments::update_enrollment,
        api::v1::courses::enrollments::delete_enrollment,
        api::v1::courses::enrollments::enrollment_progress,
        api::v1::courses::lessons::list_lessons,
        api::v1::courses::lessons::get_lesson,
        api::v1::courses::lessons::create_lesson,
        api::v1::courses::lessons::update_lesson,
        api::v1::courses::lessons::delete_lesson,
        api::v1::courses::lessons::complete_lesson,
        api::v1::courses::progress::list_progress,
        api::v1::courses::progress::get_progress,
        api::v1::courses::progress::update_lesson_progress,
        api::v1::courses::quizzes::list_quizzes,
        api::v1::courses::quizzes::get_quiz,
        api::v1::courses::quizzes::create_quiz,
        api::v1::courses::quizzes::update_quiz,
        api::v1::courses::quizzes::delete_quiz,
        api::v1::courses::quizzes::submit,
        api::v1::courses::quizzes::list_questions,
        api::v1::courses::quizzes::create_question,
        api::v1::courses::quizzes::get_question,
        api::v1::courses::quizzes::delete_question,
        api::v1::ai::assessment::quiz_analysis,
        api::v1::ai::assessment::feedback,
        api::v1::ai::assessment::gaps,
        api::v1::ai::assessment::plan,
        api::v1::ai::chat::list_sessions,
        api::v1::ai::chat::create_session,
        api::v1::ai::chat::get_session,
        api::v1::ai::chat::update_session,
        api::v1::ai::chat::delete_session,
        api::v1::ai::chat::send_message,
        api::v1::ai::feedback::list_feedback,
        api::v1::ai::feedback::get_feedback,
        api::v1::ai::recommendations::courses,
        api::v1::ai::recommendations::grade_essay,
        api::v1::ai::voice::transcribe,
        api::v1::ai::voice::text_to_speech,
        api::v1::ai::voice::lesson_audio,
        api::v1::ai::voice::command,
        global::server_version,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "v1/users", description = "Accounts, tokens, preferences and learning activity"),
        (name = "v1/courses", description = "Catalog, lessons, quizzes, enrollments and progress"),
        (name = "v1/ai", description = "Tutor chat, recommendations, grading, voice and assessment"),
    )
)]
struct ApiDoc;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token from /api/v1/users/token"))
                    .build(),
            ),
        );
    }
}

pub fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        // rapidoc points at the document already served for swagger-ui
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
}

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn test_document_lists_every_tree() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/users/token",
            "/api/v1/courses/{slug}/lessons",
            "/api/v1/ai/voice/command",
            "/api/v1/ai/assessment/study_plan",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("token"));
    }
}
