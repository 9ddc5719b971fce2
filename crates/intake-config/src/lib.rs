//! intake-config
//!
//! Persistent settings for the lab intake CLI and their on-disk storage.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
