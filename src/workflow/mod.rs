pub mod context;
pub mod enrich;
pub mod pipeline;
pub mod prompt;
