pub mod error;
pub mod grading;
pub mod progress;
