pub mod ai;
pub mod courses;
pub mod status;
pub mod users;
