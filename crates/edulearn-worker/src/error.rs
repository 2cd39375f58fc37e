use edulearn_core::ai::error::AiError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Ai(#[from] AiError),
}
