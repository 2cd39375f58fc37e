pub mod chat_message;
pub mod chat_session;
pub mod course_embedding;
pub mod feedback;
pub mod user_embedding;
