pub mod api;
pub mod error;
pub mod global;
pub mod swagger;
