pub mod chat_message;
pub mod chat_session;
pub mod embedding;
pub mod feedback;
