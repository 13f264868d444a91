pub mod dates;
pub mod handlers;
pub mod normalizer;
pub mod sections;
pub mod skills;
pub mod store;
