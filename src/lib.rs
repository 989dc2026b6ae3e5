pub mod config;
pub mod error;
pub mod service;
pub mod status;
pub mod store;
pub mod tracker;
pub mod tui;

/// Version string baked in at compile time by `build.rs`.
pub const VERSION: &str = env!("TIMELINE_VERSION");
