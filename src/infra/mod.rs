pub mod github;
pub mod linear;
pub mod llm;
