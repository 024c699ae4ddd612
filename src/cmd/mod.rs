pub mod config;
pub mod enrich;
pub mod serve;
