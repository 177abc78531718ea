pub mod actions;
pub mod config;
pub mod handlers;
pub mod prompts;
pub mod schemas;
