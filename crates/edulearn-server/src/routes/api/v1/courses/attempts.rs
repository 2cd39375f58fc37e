use crate::permissions::Permission;
use crate::routes::api::v1::courses::error::CourseError;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, get};
use axum::{Extension, Json};
use edulearn_db::quiz::{attempt, response};
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_model::quiz::{QuizAttempt, QuizResponse};
use edulearn_model_tools::convert::FromDbModel;
use protect_axum::protect;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/quiz-attempts", get(list_attempts))
        .route("/quiz-attempts/{id}", get(get_attempt))
}

async fn responses(conn: &DatabaseConnection, attempt_id: Uuid) -> Result<Vec<QuizResponse>, CourseError> {
    Ok(response::Query::list_with_selected(conn, attempt_id)
        .await?
        .into_iter()
        .map(QuizResponse::from_db_model)
        .collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/quiz-attempts",
    responses(
        (status = OK, description = "Quiz attempts of the caller with their responses, newest first", body = [QuizAttempt]),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_attempts(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, CourseError> {
    let mut attempts = Vec::new();
    for found in attempt::Query::list_for_user(&conn, user.id).await? {
        let answered = responses(&conn, found.id).await?;
        attempts.push(QuizAttempt::from_db_model((found, answered)));
    }
    Ok(Json(attempts))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/quiz-attempts/{id}",
    params(("id" = Uuid, Path, description = "quiz attempt id")),
    responses(
        (status = OK, description = "A single attempt with its graded responses", body = QuizAttempt),
        (status = NOT_FOUND, description = "Unknown attempt or owned by someone else"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_attempt(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CourseError> {
    let found = attempt::Query::find_for_user(&conn, id, user.id)
        .await?
        .ok_or(CourseError::NotFound)?;
    let answered = responses(&conn, found.id).await?;
    Ok(Json(QuizAttempt::from_db_model((found, answered))))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, bearer};
    use edulearn_core::course::grading::submit_quiz;
    use edulearn_db::course::enrollment;
    use edulearn_entity::quiz::question::QuestionType;
    use edulearn_model::quiz::{QuizSubmission, SubmittedResponse};
    use edulearn_test_helpers::fixtures::{create_course, create_lesson, create_question, create_quiz, create_user};
    use http::{Method, StatusCode};
    use test_log::test;

    #[test(tokio::test)]
    async fn test_attempts_show_selected_answers() {
        let app = TestApp::new().await;
        let instructor = create_user(&app.conn, "grader").await.unwrap();
        let student = create_user(&app.conn, "taker").await.unwrap();
        let course = create_course(&app.conn, instructor.id, "Iterators", true).await.unwrap();
        let lesson = create_lesson(&app.conn, course.id, 1, true).await.unwrap();
        let quiz = create_quiz(&app.conn, lesson.id).await.unwrap();
        let (question, answers) = create_question(
            &app.conn,
            quiz.id,
            QuestionType::MultipleChoice,
            1,
            &[("map", true), ("fold", false)],
        )
        .await
        .unwrap();
        enrollment::Mutation::enroll(&app.conn, student.id, course.id).await.unwrap();
        let graded = submit_quiz(
            &app.conn,
            student.id,
            &quiz,
            QuizSubmission {
                time_taken: 30,
                responses: vec![SubmittedResponse {
                    question_id: question.id,
                    answer_ids: vec![answers[0].id],
                    text_response: String::new(),
                }],
            },
        )
        .await
        .unwrap();

        let token = bearer(&app, student.id);
        let (status, listed) = app.request(Method::GET, "/api/v1/courses/quiz-attempts", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["score"], 100.0);

        let uri = format!("/api/v1/courses/quiz-attempts/{}", graded.attempt.id);
        let (status, single) = app.request(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(single["responses"][0]["selected_answers"][0], answers[0].id.to_string());
        assert_eq!(single["responses"][0]["is_correct"], true);

        let (status, _) = app
            .request(Method::GET, &uri, Some(&bearer(&app, instructor.id)), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
