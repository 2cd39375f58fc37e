mod sqlite;

pub mod fixtures;
pub mod schema;

pub use sqlite::*;
use std::borrow::Cow;

pub trait TestDb {
    fn db_uri(&self) -> Cow<'_, str>;
}
