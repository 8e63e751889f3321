//! Plugin controller: wires chat events to the resolution/download
//! pipeline and delivers replies through the host channel.
//!
//! One message is handled to completion before the next: resolve, prune
//! the asset cache, send the summary text, download, send the file. Every
//! terminal failure becomes a plain-text reply; nothing here panics or
//! propagates an error into the host's dispatch loop.

pub mod compose;

use crate::channel::{send_with_retry, Reply, ReplyChannel};
use crate::core::config::PluginConfig;
use crate::core::error::AppResult;
use crate::core::retry::RetryPolicy;
use crate::core::shorten;
use crate::download::{asset_file_name, AssetJanitor, DownloadError, Downloader};
use crate::resolve::{self, MetadataResolver, Resolution, VideoMetadata};
use std::fs;
use std::path::{Path, PathBuf};

/// Kind of an incoming chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Image,
    Voice,
}

/// An incoming chat event from the host framework.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub kind: MessageKind,
    pub content: String,
}

impl ChatEvent {
    /// Convenience constructor for a text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: content.into(),
        }
    }
}

/// What the host dispatcher should do with the event afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// Not ours, let other handlers see it.
    Pass,
    /// Handled here; stop propagation.
    Consumed,
}

/// The wired-up pipeline, ready to handle messages.
pub struct DouyinPlugin {
    config: PluginConfig,
    resolver: MetadataResolver,
    downloader: Downloader,
    janitor: AssetJanitor,
    assets_dir: PathBuf,
}

impl DouyinPlugin {
    /// Builds the pipeline from a validated config.
    ///
    /// The one construction side effect is creating `assets_dir` so the
    /// first download has somewhere to land.
    pub fn new(config: PluginConfig, assets_dir: impl Into<PathBuf>) -> AppResult<Self> {
        config.validate()?;

        let assets_dir = assets_dir.into();
        fs::create_dir_all(&assets_dir)?;
        log::debug!("Assets directory ready at {}", assets_dir.display());

        Ok(Self {
            resolver: MetadataResolver::new(&config.api_base_url),
            downloader: Downloader::new(config.limit_size_mb),
            janitor: AssetJanitor::new(&assets_dir, config.retention_policy()),
            config,
            assets_dir,
        })
    }

    /// Loads (or creates with defaults) the config file, then builds the
    /// pipeline.
    pub fn from_config_file(config_path: &Path, assets_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let config = PluginConfig::load_or_create(config_path)?;
        Self::new(config, assets_dir)
    }

    /// Swaps in custom retry policies (tests shrink the delays).
    #[must_use]
    pub fn with_retry_policies(mut self, resolve: RetryPolicy, download: RetryPolicy) -> Self {
        self.resolver = MetadataResolver::with_policy(&self.config.api_base_url, resolve);
        self.downloader = Downloader::with_policy(self.config.limit_size_mb, download);
        self
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Handles one chat event end to end.
    ///
    /// Cheap early exits for non-text messages and messages without a
    /// platform link; the common case must not touch the network.
    pub async fn handle_message(&self, event: &ChatEvent, channel: &dyn ReplyChannel) -> EventAction {
        if event.kind != MessageKind::Text {
            return EventAction::Pass;
        }
        if !resolve::is_douyin_link(&event.content) {
            return EventAction::Pass;
        }
        let Some(share_url) = resolve::extract_share_url(&event.content) else {
            // Domain mentioned but no actionable link substring.
            return EventAction::Pass;
        };

        log::info!("Handling share link: {}", share_url);

        let meta = match self.resolver.resolve(share_url).await {
            Resolution::Resolved(meta) => meta,
            Resolution::NoData => {
                send_with_retry(channel, Reply::Text(compose::no_metadata())).await;
                return EventAction::Consumed;
            }
        };

        let Some(play_url) = meta.play_url.clone() else {
            send_with_retry(channel, Reply::Text(compose::no_play_url())).await;
            return EventAction::Consumed;
        };

        // Bound the cache before this message adds to it. Runs to
        // completion before the destination file exists, so the new
        // download is never a deletion candidate.
        let removed = self.janitor.prune();
        if removed > 0 {
            log::debug!("Janitor removed {} stale asset(s)", removed);
        }

        let play_link = match &self.config.shortener_base_url {
            Some(base) => shorten::shorten_url(base, &play_url).await.unwrap_or(play_url),
            None => play_url,
        };

        send_with_retry(channel, Reply::Text(compose::video_summary(&meta, &play_link))).await;

        self.deliver_video(&meta, share_url, channel).await;
        EventAction::Consumed
    }

    /// Downloads the media and sends it, mapping each terminal download
    /// failure to its text reply.
    async fn deliver_video(&self, meta: &VideoMetadata, share_url: &str, channel: &dyn ReplyChannel) {
        let download_url = self.config.download_endpoint(share_url);
        let dest = self
            .assets_dir
            .join(asset_file_name(&meta.desc, chrono::Utc::now().timestamp()));

        match self.downloader.download(&download_url, &dest, meta.data_size).await {
            Ok(()) => {
                send_with_retry(channel, Reply::Video(dest.clone())).await;
                if self.config.delete_after_send {
                    if let Err(e) = fs::remove_file(&dest) {
                        log::warn!("Failed to remove sent asset {}: {}", dest.display(), e);
                    }
                }
            }
            Err(DownloadError::SizeExceeded { size_mb, limit_mb }) => {
                send_with_retry(channel, Reply::Text(compose::size_exceeded(size_mb, limit_mb))).await;
            }
            Err(DownloadError::RetryExhausted { attempts }) => {
                log::warn!("Giving up on {} after {} attempt(s)", download_url, attempts);
                send_with_retry(channel, Reply::Text(compose::download_failed())).await;
            }
        }
    }
}
