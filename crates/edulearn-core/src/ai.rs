pub mod assessment;
pub mod chat;
pub mod embedding;
pub mod error;
pub mod grading;
pub mod recommendation;
pub mod voice;
