pub mod category;
#[allow(clippy::module_inception)]
pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod lesson_progress;
