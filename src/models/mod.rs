pub mod query;
pub mod weather;
