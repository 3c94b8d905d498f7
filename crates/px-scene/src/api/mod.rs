pub mod config;
pub mod diagnostics;
pub mod runner;
pub mod types;
