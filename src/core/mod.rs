//! Core utilities, configuration, and common functionality

pub mod config;
pub mod error;
pub mod logging;
pub mod retry;
pub mod shorten;
pub mod utils;

// Re-exports for convenience
pub use config::{PluginConfig, RetentionMode};
pub use error::{AppError, AppResult};
pub use logging::init_logger;
pub use retry::{retry, RetryPolicy, Retryable};
