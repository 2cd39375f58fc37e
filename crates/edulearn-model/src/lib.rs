pub mod assessment;
pub mod chat;
pub mod course;
pub mod login;
pub mod quiz;
pub mod recommendation;
pub mod status;
pub mod user;
pub mod voice;
