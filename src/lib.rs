pub mod arguments;
pub mod config;
pub mod error;
pub mod patchers;
pub mod rules;
pub mod runner;
pub mod version;
