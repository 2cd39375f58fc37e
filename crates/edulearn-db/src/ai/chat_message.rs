mod mutation;
mod query;

pub use mutation::*;
pub use query::*;
