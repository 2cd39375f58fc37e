pub mod error;
pub mod queue;
pub mod task;
pub mod worker;

pub use queue::TaskQueue;
pub use task::Task;
pub use worker::{Worker, spawn};
