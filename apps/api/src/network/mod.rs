pub mod edges;
pub mod graph;
pub mod handlers;
