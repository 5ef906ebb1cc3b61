pub mod query;
pub mod schema;
