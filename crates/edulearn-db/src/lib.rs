pub mod activity;
pub mod ai;
pub mod course;
pub mod preference;
pub mod quiz;
pub mod user;
pub mod util;

pub use sea_orm;
