//! Link detection and metadata resolution

pub mod api;
pub mod link;

// Re-exports for convenience
pub use api::{MetadataResolver, Resolution, VideoMetadata};
pub use link::{extract_share_url, is_douyin_link};
