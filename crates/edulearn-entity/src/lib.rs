pub mod ai;
pub mod course;
pub mod learning_activity;
pub mod quiz;
pub mod user;
pub mod user_preference;
