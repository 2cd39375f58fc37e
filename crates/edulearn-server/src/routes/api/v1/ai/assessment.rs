use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v1::ai::error::AiError;
use crate::routes::error::ValidationErrors;
use crate::user::ExtractUser;
use axum::extract::Query;
use axum::response::IntoResponse;
use axum::routing::{Router, get, post};
use axum::{Extension, Json};
use chrono::Utc;
use edulearn_core::ai::assessment::{analyze_quiz, knowledge_gaps, personalized_feedback, study_plan};
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_model::assessment::{KnowledgeGap, PersonalizedFeedback, QuizAnalysis, StudyPlan, StudyPlanRequest};
use protect_axum::protect;
use serde::Deserialize;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/quiz_analysis", get(quiz_analysis))
        .route("/personalized_feedback", get(feedback))
        .route("/knowledge_gaps", get(gaps))
        .route("/study_plan", post(plan))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalysisQuery {
    pub quiz_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseFilter {
    pub course_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/v1/ai/assessment/quiz_analysis",
    params(
        ("quiz_id" = Uuid, Query, description = "quiz to analyze"),
        ("user_id" = Option<Uuid>, Query, description = "whose latest attempt to include, defaults to the caller"),
    ),
    responses(
        (status = OK, description = "Quiz statistics and the latest attempt of the user", body = QuizAnalysis),
        (status = BAD_REQUEST, description = "Missing quiz_id"),
        (status = FORBIDDEN, description = "Another user's results requested by someone other than the instructor"),
        (status = NOT_FOUND, description = "Unknown quiz"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn quiz_analysis(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Query(query): Query<AnalysisQuery>,
) -> Result<impl IntoResponse, AiError> {
    let quiz_id = query
        .quiz_id
        .ok_or_else(|| ValidationErrors::field("quiz_id", "Quiz ID is required"))?;
    let analysis = analyze_quiz(&conn, &user, quiz_id, query.user_id).await?;
    Ok(Json(analysis))
}

#[utoipa::path(
    get,
    path = "/api/v1/ai/assessment/personalized_feedback",
    params(("course_id" = Option<Uuid>, Query, description = "restrict the report to one enrolled course")),
    responses(
        (status = OK, description = "Performance per course with generated advice", body = PersonalizedFeedback),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn feedback(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Query(filter): Query<CourseFilter>,
) -> Result<impl IntoResponse, AiError> {
    let report = personalized_feedback(&conn, app_config.llm_config(), &user, filter.course_id).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/v1/ai/assessment/knowledge_gaps",
    responses(
        (status = OK, description = "Lessons with repeated mistakes, most issues first", body = [KnowledgeGap]),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn gaps(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, AiError> {
    let found = knowledge_gaps(&conn, user.id).await?;
    tracing::debug!(user = %user.id, gaps = found.len(), "found knowledge gaps");
    Ok(Json(found))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/assessment/study_plan",
    request_body = StudyPlanRequest,
    responses(
        (status = OK, description = "Remaining lessons per course with a generated schedule", body = StudyPlan),
        (status = BAD_REQUEST, description = "Target date is not in the future"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn plan(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Json(request): Json<StudyPlanRequest>,
) -> Result<impl IntoResponse, AiError> {
    let today = Utc::now().date_naive();
    let planned = study_plan(&conn, app_config.llm_config(), &user, &request, today).await?;
    Ok(Json(planned))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, bearer};
    use chrono::{Days, Utc};
    use edulearn_core::ai::assessment::{NO_ACTIVE_COURSES, NO_COURSE_DATA, TARGET_DATE_IN_PAST};
    use edulearn_core::course::grading::submit_quiz;
    use edulearn_db::course::enrollment;
    use edulearn_entity::quiz::question::QuestionType;
    use edulearn_model::quiz::{QuizSubmission, SubmittedResponse};
    use edulearn_test_helpers::fixtures::{create_course, create_lesson, create_question, create_quiz, create_user};
    use http::{Method, StatusCode};
    use serde_json::json;
    use test_log::test;
    use uuid::Uuid;

    #[test(tokio::test)]
    async fn test_quiz_analysis_permissions() {
        let app = TestApp::new().await;
        let instructor = create_user(&app.conn, "examiner").await.unwrap();
        let student = create_user(&app.conn, "examinee").await.unwrap();
        let classmate = create_user(&app.conn, "onlooker").await.unwrap();
        let course = create_course(&app.conn, instructor.id, "Pattern Matching", true).await.unwrap();
        let lesson = create_lesson(&app.conn, course.id, 1, true).await.unwrap();
        let quiz = create_quiz(&app.conn, lesson.id).await.unwrap();
        let (question, answers) = create_question(
            &app.conn,
            quiz.id,
            QuestionType::TrueFalse,
            2,
            &[("true", true), ("false", false)],
        )
        .await
        .unwrap();
        enrollment::Mutation::enroll(&app.conn, student.id, course.id).await.unwrap();
        submit_quiz(
            &app.conn,
            student.id,
            &quiz,
            QuizSubmission {
                time_taken: 45,
                responses: vec![SubmittedResponse {
                    question_id: question.id,
                    answer_ids: vec![answers[1].id],
                    text_response: String::new(),
                }],
            },
        )
        .await
        .unwrap();

        let (status, _) = app
            .request(
                Method::GET,
                "/api/v1/ai/assessment/quiz_analysis",
                Some(&bearer(&app, student.id)),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .request(
                Method::GET,
                &format!("/api/v1/ai/assessment/quiz_analysis?quiz_id={}", Uuid::new_v4()),
                Some(&bearer(&app, student.id)),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, own) = app
            .request(
                Method::GET,
                &format!("/api/v1/ai/assessment/quiz_analysis?quiz_id={}", quiz.id),
                Some(&bearer(&app, student.id)),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(own["quiz_title"], "Checkpoint");
        assert_eq!(own["statistics"]["attempt_count"], 1);
        assert_eq!(own["question_statistics"][0]["correct_percentage"], 0.0);
        assert_eq!(own["user_attempt"]["score"], 0.0);

        let foreign = format!("/api/v1/ai/assessment/quiz_analysis?quiz_id={}&user_id={}", quiz.id, student.id);
        let (status, _) = app
            .request(Method::GET, &foreign, Some(&bearer(&app, classmate.id)), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, reviewed) = app
            .request(Method::GET, &foreign, Some(&bearer(&app, instructor.id)), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reviewed["user_attempt"]["time_taken"], 45);
    }

    #[test(tokio::test)]
    async fn test_reports_without_course_data() {
        let app = TestApp::new().await;
        let user = create_user(&app.conn, "newcomer").await.unwrap();
        let token = bearer(&app, user.id);

        let (status, report) = app
            .request(Method::GET, "/api/v1/ai/assessment/personalized_feedback", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["message"], NO_COURSE_DATA);
        assert_eq!(report["recommendations"], json!([]));

        let (status, gaps) = app
            .request(Method::GET, "/api/v1/ai/assessment/knowledge_gaps", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(gaps, json!([]));

        let (status, plan) = app
            .request(Method::POST, "/api/v1/ai/assessment/study_plan", Some(&token), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plan["message"], NO_ACTIVE_COURSES);

        let yesterday = Utc::now().date_naive().checked_sub_days(Days::new(1)).unwrap();
        let (status, rejected) = app
            .request(
                Method::POST,
                "/api/v1/ai/assessment/study_plan",
                Some(&token),
                Some(json!({ "target_date": yesterday })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(rejected["detail"], TARGET_DATE_IN_PAST);
    }

    #[test(tokio::test)]
    async fn test_far_future_plan_is_bounded() {
        let app = TestApp::new().await;
        let instructor = create_user(&app.conn, "planner").await.unwrap();
        let student = create_user(&app.conn, "procrastinator").await.unwrap();
        let course = create_course(&app.conn, instructor.id, "Macros", true).await.unwrap();
        create_lesson(&app.conn, course.id, 1, true).await.unwrap();
        enrollment::Mutation::enroll(&app.conn, student.id, course.id).await.unwrap();

        let (status, plan) = app
            .request(
                Method::POST,
                "/api/v1/ai/assessment/study_plan",
                Some(&bearer(&app, student.id)),
                Some(json!({"target_date": "9999-12-31"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plan["courses"][0]["remaining_lessons"], 1);
        assert_eq!(plan["study_plan"]["weekly_plan"].as_array().unwrap().len(), 52);
    }
}
