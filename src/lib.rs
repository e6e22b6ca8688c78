pub mod config;
pub mod history;
pub mod http;
pub mod model;
pub mod orchestrator;
pub mod safety;
pub mod types;
