pub mod args;
pub mod media;
pub mod net;
pub mod tracing;
