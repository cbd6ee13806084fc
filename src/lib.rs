pub mod ai_provider;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod inference;
pub mod pipeline;
pub mod reports;
