pub mod candidate;
pub mod query;
