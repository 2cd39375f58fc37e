use strum::Display;
use uuid::Uuid;

/// Deferred work executed outside the request that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Task {
    GradeEssayResponse(Uuid),
    UpdateUserEmbedding(Uuid),
    UpdateCourseEmbedding(Uuid),
    UpdateAllEmbeddings,
}
