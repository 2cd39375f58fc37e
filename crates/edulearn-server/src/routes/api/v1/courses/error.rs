use crate::routes::error::{FORBIDDEN, NOT_FOUND, SERVER_ERROR, ValidationErrors, detail};
use axum::response::{IntoResponse, Response};
use edulearn_core::course::error::CourseError as CoreCourseError;
use edulearn_db::sea_orm::DbErr;
use http::StatusCode;
use std::error::Error;
use thiserror::Error;

const ALREADY_ENROLLED: &str = "You are already enrolled in this course.";

#[derive(Error, Debug)]
pub(crate) enum CourseError {
    #[error("Database error.")]
    SeaOrmError(#[from] DbErr),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Course(#[from] CoreCourseError),

    #[error("Course/lesson/quiz/enrollment could not be found")]
    NotFound,

    #[error("Only the instructor may change this course")]
    Forbidden,

    #[error("{ALREADY_ENROLLED}")]
    AlreadyEnrolled,
}

impl IntoResponse for CourseError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound | Self::SeaOrmError(DbErr::RecordNotFound(_)) => detail(StatusCode::NOT_FOUND, NOT_FOUND),
            Self::Forbidden => detail(StatusCode::FORBIDDEN, FORBIDDEN),
            Self::Validation(errors) => errors.into_response(),
            Self::AlreadyEnrolled => detail(StatusCode::BAD_REQUEST, ALREADY_ENROLLED),
            Self::Course(
                error @ (CoreCourseError::NotEnrolled
                | CoreCourseError::UnknownQuestion(_)
                | CoreCourseError::DuplicateQuestion(_)
                | CoreCourseError::UnknownAnswer(_)),
            ) => detail(StatusCode::BAD_REQUEST, error.to_string()),
            error => {
                tracing::error!(error = &error as &dyn Error, "course request failed");
                detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use test_log::test;
    use uuid::Uuid;

    async fn body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test(tokio::test)]
    async fn test_grading_errors_are_bad_requests() {
        let response = CourseError::Course(CoreCourseError::NotEnrolled).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(response).await, json!({"detail": "You are not enrolled in this course."}));

        let response = CourseError::Course(CoreCourseError::UnknownAnswer(Uuid::nil())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = CourseError::Course(CoreCourseError::DuplicateQuestion(Uuid::nil())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = CourseError::Course(CoreCourseError::Database(DbErr::Custom("down".to_owned()))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
