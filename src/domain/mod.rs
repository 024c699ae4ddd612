pub mod context;
pub mod keywords;
pub mod ticket;
pub mod webhook;
