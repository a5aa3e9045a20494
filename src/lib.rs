pub mod bulk;
pub mod config;
pub mod error;
pub mod plan;
pub mod report;
pub mod runner;
pub mod spacelift;
