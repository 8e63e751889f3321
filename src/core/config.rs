//! Plugin configuration loaded from a JSON file.
//!
//! The config file is created with defaults on first run so a fresh
//! deployment only has to fill in `api_base_url`. It is read once at
//! startup and treated as read-only for the pipeline's lifetime.

use crate::core::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which asset-cache retention strategy the janitor applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionMode {
    /// Keep the newest `keep_newest_count` media files, delete the rest.
    CountBased,
    /// Delete media files older than `keep_assets_days` days.
    AgeBased,
}

/// Runtime configuration for the plugin.
///
/// Serialized as JSON; unknown keys are ignored and missing keys fall
/// back to defaults, so config files from older versions keep working.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Base URL of the unofficial video-data API (no trailing slash needed).
    pub api_base_url: String,
    /// Maximum accepted media size in MB.
    pub limit_size_mb: u64,
    /// Retention window for the age-based janitor, in days.
    pub keep_assets_days: u64,
    /// How many files the count-based janitor retains.
    pub keep_newest_count: usize,
    /// Which janitor strategy runs before each download.
    pub retention: RetentionMode,
    /// Base URL of the optional link shortener; `None` disables shortening.
    pub shortener_base_url: Option<String>,
    /// Delete the asset right after a successful video send instead of
    /// leaving it to the janitor.
    pub delete_after_send: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            limit_size_mb: 50,
            keep_assets_days: 3,
            keep_newest_count: 3,
            retention: RetentionMode::CountBased,
            shortener_base_url: None,
            delete_after_send: false,
        }
    }
}

impl PluginConfig {
    /// Loads the config from `path`, writing a default file first if none
    /// exists.
    pub fn load_or_create(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            log::info!("Config file {} not found, creating defaults", path.display());
            let defaults = Self::default();
            defaults.save(path)?;
            return Ok(defaults);
        }

        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Writes the config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Checks that the config is usable: `api_base_url` must be a valid
    /// absolute URL.
    pub fn validate(&self) -> AppResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::Config(
                "api_base_url is empty, set it to the video-data API base URL".to_string(),
            ));
        }
        url::Url::parse(&self.api_base_url)?;
        Ok(())
    }

    /// Size limit in raw bytes.
    pub fn limit_size_bytes(&self) -> u64 {
        self.limit_size_mb * 1024 * 1024
    }

    /// Endpoint for metadata resolution.
    pub fn video_data_endpoint(&self) -> String {
        format!("{}/api/hybrid/video_data", self.api_base_url.trim_end_matches('/'))
    }

    /// Endpoint that streams the watermark-free media for a share link.
    pub fn download_endpoint(&self, share_link: &str) -> String {
        format!(
            "{}/api/download?url={}&prefix=true&with_watermark=false",
            self.api_base_url.trim_end_matches('/'),
            urlencoding::encode(share_link)
        )
    }

    /// Maps the configured retention mode onto a janitor policy.
    pub fn retention_policy(&self) -> crate::download::assets::RetentionPolicy {
        use crate::download::assets::RetentionPolicy;
        match self.retention {
            RetentionMode::CountBased => RetentionPolicy::KeepNewest(self.keep_newest_count),
            RetentionMode::AgeBased => RetentionPolicy::MaxAgeDays(self.keep_assets_days),
        }
    }
}
