//! Utility modules for error handling and configuration

pub mod config;
pub mod error;
pub mod platform;

// Re-export for convenience
pub use config::{LogLevel, Settings};
pub use error::YtfetchError;
