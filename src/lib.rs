pub mod algorithms;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod hardware;
pub mod metrics;
pub mod models;
pub(crate) mod names;
pub mod output;
pub mod presets;
pub mod scheduler;
pub mod server;
pub mod state;
pub mod traffic;
