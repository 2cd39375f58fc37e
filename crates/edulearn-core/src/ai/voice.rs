use crate::ai::chat;
use crate::llm_config::LlmConfig;
use crate::tts::config::TTSConfig;
use crate::tts::synthesize_to_media;
use edulearn_db::course::{course, enrollment, progress};
use edulearn_entity::user::Model as UserModel;
use edulearn_model::voice::{VoiceAction, VoiceCommandResult};
use edulearn_utils::media::MediaStore;
use sea_orm::{ConnectionTrait, DbErr};
use serde_json::{Value, json};
use std::error::Error;
use tracing::instrument;

const SEARCH_LIMIT: u64 = 5;
const SEARCH_PHRASES: [&str; 3] = ["find course", "search course", "search for course"];
const ENROLLMENT_PHRASES: [&str; 2] = ["my courses", "enrolled courses"];
const CONTINUE_PHRASES: [&str; 2] = ["continue learning", "resume course"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceIntent {
    SearchCourses(String),
    ListEnrollments,
    ContinueLearning,
    AskTutor(String),
}

fn contains_any(command: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| command.contains(phrase))
}

/// The search term is whatever follows the last "course" (or "courses").
fn search_term(command: &str) -> String {
    let tail = command.rsplit("course").next().unwrap_or_default();
    let tail = match tail.strip_prefix('s') {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => tail,
    };
    tail.trim().to_owned()
}

/// Picks the action for a spoken or typed command. The first matching rule wins.
#[must_use]
pub fn route_command(text: &str) -> VoiceIntent {
    let command = text.to_lowercase();
    if contains_any(&command, &SEARCH_PHRASES) {
        let term = search_term(&command);
        if !term.is_empty() {
            return VoiceIntent::SearchCourses(term);
        }
    } else if contains_any(&command, &ENROLLMENT_PHRASES) {
        return VoiceIntent::ListEnrollments;
    } else if contains_any(&command, &CONTINUE_PHRASES) {
        return VoiceIntent::ContinueLearning;
    }
    VoiceIntent::AskTutor(text.to_owned())
}

fn result(action: VoiceAction, data: Value, message: String) -> VoiceCommandResult {
    VoiceCommandResult {
        success: true,
        action,
        data,
        message,
        speak_response: true,
        audio_url: None,
    }
}

/// Runs a voice command on behalf of `user`.
#[instrument(skip(conn, llm_config, user, text), fields(user = %user.id))]
pub async fn execute_command<C: ConnectionTrait>(
    conn: &C,
    llm_config: &LlmConfig,
    user: &UserModel,
    text: &str,
) -> Result<VoiceCommandResult, DbErr> {
    let intent = route_command(text);
    tracing::debug!(?intent, "routed voice command");

    match intent {
        VoiceIntent::SearchCourses(term) => {
            let courses = course::Query::search_published_by_title(conn, &term, SEARCH_LIMIT).await?;
            let message = if courses.is_empty() {
                format!("I couldn't find any courses matching '{term}'")
            } else {
                format!("I found {} courses matching '{term}'", courses.len())
            };
            let data = courses
                .into_iter()
                .map(|course| json!({"id": course.id, "title": course.title, "slug": course.slug}))
                .collect();
            Ok(result(VoiceAction::SearchCourses, Value::Array(data), message))
        }
        VoiceIntent::ListEnrollments => {
            let enrollments = enrollment::Query::list_with_courses(conn, user.id, None, None).await?;
            let message = if enrollments.is_empty() {
                "You are not enrolled in any courses yet".to_owned()
            } else {
                format!("You are enrolled in {} courses", enrollments.len())
            };
            let data = enrollments
                .into_iter()
                .map(|(enrollment, course)| {
                    json!({
                        "id": course.id,
                        "title": course.title,
                        "slug": course.slug,
                        "progress": enrollment.progress,
                    })
                })
                .collect();
            Ok(result(VoiceAction::ListEnrollments, Value::Array(data), message))
        }
        VoiceIntent::ContinueLearning => {
            let latest = progress::Query::latest_in_progress(conn, user.id).await?;
            let resumed = match latest {
                Some((_, lesson)) => course::Query::find_by_id(conn, lesson.course_id)
                    .await?
                    .map(|course| (course, lesson)),
                None => None,
            };
            Ok(match resumed {
                Some((course, lesson)) => result(
                    VoiceAction::ContinueLearning,
                    json!({
                        "course_id": course.id,
                        "course_slug": course.slug,
                        "lesson_id": lesson.id,
                        "lesson_slug": lesson.slug,
                        "lesson_title": lesson.title,
                    }),
                    format!("Resuming {} in {}", lesson.title, course.title),
                ),
                None => result(
                    VoiceAction::ContinueLearning,
                    Value::Null,
                    "You don't have any lessons in progress".to_owned(),
                ),
            })
        }
        VoiceIntent::AskTutor(question) => {
            let answer = chat::ask(conn, llm_config, user, question.clone()).await?;
            Ok(result(
                VoiceAction::AiResponse,
                json!({"question": question, "answer": answer}),
                answer,
            ))
        }
    }
}

/// Adds the spoken message when text to speech is available. Synthesis failures leave the result untouched.
pub async fn attach_audio(
    mut result: VoiceCommandResult,
    tts_config: Option<&TTSConfig>,
    media: &MediaStore,
) -> VoiceCommandResult {
    let Some(tts_config) = tts_config else {
        return result;
    };
    match synthesize_to_media(tts_config, media, &result.message).await {
        Ok(url) => result.audio_url = Some(url),
        Err(error) => tracing::warn!(error = &error as &dyn Error, "failed to synthesize voice response"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::progress::update_progress;
    use edulearn_entity::course::lesson_progress::Status;
    use edulearn_test_helpers::fixtures::{create_course, create_lesson, create_user};
    use edulearn_test_helpers::schema::memory_db;
    use test_log::test;

    #[test]
    fn test_route_command() {
        assert_eq!(
            route_command("Find course Rust Basics"),
            VoiceIntent::SearchCourses("rust basics".to_owned())
        );
        assert_eq!(
            route_command("search for courses python"),
            VoiceIntent::SearchCourses("python".to_owned())
        );
        assert_eq!(route_command("Show my courses"), VoiceIntent::ListEnrollments);
        assert_eq!(route_command("please continue learning"), VoiceIntent::ContinueLearning);
        assert_eq!(route_command("resume course"), VoiceIntent::ContinueLearning);
        assert_eq!(
            route_command("What is a lifetime?"),
            VoiceIntent::AskTutor("What is a lifetime?".to_owned())
        );
    }

    #[test]
    fn test_empty_search_term_asks_tutor() {
        assert_eq!(
            route_command("find course"),
            VoiceIntent::AskTutor("find course".to_owned())
        );
    }

    #[test(tokio::test)]
    async fn test_search_and_enrollments() {
        let db = memory_db().await.unwrap();
        let user = create_user(&db, "margaret").await.unwrap();
        let rust = create_course(&db, user.id, "Rust Basics", true).await.unwrap();
        create_course(&db, user.id, "Rust Internals", false).await.unwrap();
        let llm_config = LlmConfig::default();

        let found = execute_command(&db, &llm_config, &user, "find course rust").await.unwrap();
        assert_eq!(found.action, VoiceAction::SearchCourses);
        assert_eq!(found.message, "I found 1 courses matching 'rust'");
        assert_eq!(found.data[0]["slug"], "rust-basics");

        let none = execute_command(&db, &llm_config, &user, "my courses").await.unwrap();
        assert_eq!(none.message, "You are not enrolled in any courses yet");

        enrollment::Mutation::enroll(&db, user.id, rust.id).await.unwrap();
        let listed = execute_command(&db, &llm_config, &user, "my courses").await.unwrap();
        assert_eq!(listed.message, "You are enrolled in 1 courses");
        assert_eq!(listed.data[0]["progress"], 0.0);
    }

    #[test(tokio::test)]
    async fn test_continue_learning() {
        let db = memory_db().await.unwrap();
        let user = create_user(&db, "barbara").await.unwrap();
        let course = create_course(&db, user.id, "Databases", true).await.unwrap();
        let lesson = create_lesson(&db, course.id, 1, true).await.unwrap();
        let llm_config = LlmConfig::default();

        let nothing = execute_command(&db, &llm_config, &user, "continue learning").await.unwrap();
        assert!(nothing.data.is_null());
        assert_eq!(nothing.message, "You don't have any lessons in progress");

        let enrollment = enrollment::Mutation::enroll(&db, user.id, course.id).await.unwrap();
        let started = progress::Mutation::get_or_create(&db, enrollment.id, lesson.id).await.unwrap();
        update_progress(&db, &started, Some(Status::InProgress), None).await.unwrap();

        let resumed = execute_command(&db, &llm_config, &user, "continue learning").await.unwrap();
        assert_eq!(resumed.message, "Resuming Lesson 1 in Databases");
        assert_eq!(resumed.data["lesson_slug"], "lesson-1");
    }

    #[test(tokio::test)]
    async fn test_question_goes_to_tutor() {
        let db = memory_db().await.unwrap();
        let user = create_user(&db, "edsger").await.unwrap();
        let answered = execute_command(&db, &LlmConfig::default(), &user, "Explain traits")
            .await
            .unwrap();
        assert_eq!(answered.action, VoiceAction::AiResponse);
        assert_eq!(answered.message, chat::FALLBACK_REPLY);
        assert_eq!(answered.data["question"], "Explain traits");
    }
}
