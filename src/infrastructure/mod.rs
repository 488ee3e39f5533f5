pub mod edge;
pub mod workspace;
