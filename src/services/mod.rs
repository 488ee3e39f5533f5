pub mod cleaner;
pub mod edge;
pub mod fetcher;
pub mod pipeline;
pub mod retry;
