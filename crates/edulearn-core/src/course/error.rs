use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CourseError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("You are not enrolled in this course.")]
    NotEnrolled,
    #[error("Question {0} does not belong to this quiz")]
    UnknownQuestion(Uuid),
    #[error("Question {0} was answered more than once")]
    DuplicateQuestion(Uuid),
    #[error("Answer {0} does not belong to its question")]
    UnknownAnswer(Uuid),
}
