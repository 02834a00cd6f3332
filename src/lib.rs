pub mod app;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod session;
pub mod targets;
pub mod types;
pub mod upstream;
