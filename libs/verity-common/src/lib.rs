pub mod catalog;
pub mod config;
pub mod language;
pub mod types;
