//! Media download and asset-cache management

pub mod assets;
pub mod downloader;

// Re-exports for convenience
pub use assets::{asset_file_name, AssetJanitor, RetentionPolicy};
pub use downloader::{DownloadError, Downloader};
