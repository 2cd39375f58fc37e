use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v1::ai::error::AiError;
use crate::routes::error::ValidationErrors;
use crate::user::ExtractUser;
use axum::response::IntoResponse;
use axum::routing::{Router, post};
use axum::{Extension, Json};
use edulearn_core::ai::grading::grade_user_essay;
use edulearn_core::ai::recommendation::recommend_courses;
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_model::recommendation::{CourseRecommendation, EssayGrade, EssayGradingRequest, RecommendationRequest};
use protect_axum::protect;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/courses", post(courses))
        .route("/grade_essay", post(grade_essay))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/recommendations/courses",
    request_body = RecommendationRequest,
    responses(
        (status = OK, description = "Courses ranked by similarity to the caller's profile", body = [CourseRecommendation]),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn courses(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Json(request): Json<RecommendationRequest>,
) -> Result<impl IntoResponse, AiError> {
    let recommended = recommend_courses(&conn, app_config.llm_config(), user.id, &request).await?;
    tracing::debug!(count = recommended.len(), "recommended courses");
    Ok(Json(recommended))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/recommendations/grade_essay",
    request_body = EssayGradingRequest,
    responses(
        (status = OK, description = "Score and feedback, also stored as AI feedback", body = EssayGrade),
        (status = BAD_REQUEST, description = "Blank essay or max_score below 1"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn grade_essay(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Json(request): Json<EssayGradingRequest>,
) -> Result<impl IntoResponse, AiError> {
    let mut errors = ValidationErrors::new();
    if request.essay_text.trim().is_empty() {
        errors.add("essay_text", "This field may not be blank.");
    }
    if request.max_score < 1 {
        errors.add("max_score", "Ensure this value is greater than or equal to 1.");
    }
    errors.check()?;

    let grade = grade_user_essay(&conn, app_config.llm_config(), user.id, &request).await?;
    Ok(Json(grade))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, bearer};
    use edulearn_db::ai::feedback;
    use edulearn_db::course::enrollment;
    use edulearn_test_helpers::fixtures::{create_course, create_user};
    use http::{Method, StatusCode};
    use serde_json::json;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_recommendations_fall_back_to_popular_courses() {
        let app = TestApp::new().await;
        let instructor = create_user(&app.conn, "prof").await.unwrap();
        let student = create_user(&app.conn, "pupil").await.unwrap();
        let classmate = create_user(&app.conn, "classmate").await.unwrap();
        let taken = create_course(&app.conn, instructor.id, "Ownership", true).await.unwrap();
        let popular = create_course(&app.conn, instructor.id, "Concurrency", true).await.unwrap();
        create_course(&app.conn, instructor.id, "Unsafe", false).await.unwrap();
        enrollment::Mutation::enroll(&app.conn, student.id, taken.id).await.unwrap();
        enrollment::Mutation::enroll(&app.conn, classmate.id, popular.id).await.unwrap();
        let token = bearer(&app, student.id);

        let (status, recommended) = app
            .request(Method::POST, "/api/v1/ai/recommendations/courses", Some(&token), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::OK);
        let slugs: Vec<_> = recommended
            .as_array()
            .unwrap()
            .iter()
            .map(|course| course["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, ["concurrency"]);
        assert_eq!(recommended[0]["similarity_score"], 0.0);

        let (_, with_enrolled) = app
            .request(
                Method::POST,
                "/api/v1/ai/recommendations/courses",
                Some(&token),
                Some(json!({"count": 1, "include_enrolled": true})),
            )
            .await;
        assert_eq!(with_enrolled.as_array().unwrap().len(), 1);
    }

    #[test(tokio::test)]
    async fn test_grade_essay_records_feedback() {
        let app = TestApp::new().await;
        let user = create_user(&app.conn, "essayist").await.unwrap();
        let token = bearer(&app, user.id);

        let (status, _) = app
            .request(
                Method::POST,
                "/api/v1/ai/recommendations/grade_essay",
                Some(&token),
                Some(json!({"essay_text": "Traits enable polymorphism.", "max_score": 0})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, grade) = app
            .request(
                Method::POST,
                "/api/v1/ai/recommendations/grade_essay",
                Some(&token),
                Some(json!({"essay_text": "Traits enable polymorphism.", "max_score": 10})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(grade["score"], 0.0);
        assert_eq!(grade["feedback"], "Error processing essay. Please try again later.");

        let stored = feedback::Query::list_for_user(&app.conn, user.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content_type, "essay");
        assert_eq!(stored[0].content_id, None);
    }
}
