//! Metadata resolution through the unofficial hybrid video-data API.
//!
//! `GET {api_base_url}/api/hybrid/video_data?url=<link>` returns a deeply
//! nested JSON document in which almost every field may be absent. The
//! response is parsed in a single typed step, with `Option` at every
//! nesting level, then flattened into [`VideoMetadata`] with the documented
//! defaults, so the "what does absence mean" policy lives in one place.
//!
//! Two failure shapes collapse into the same terminal outcome: the API
//! answering without a `data` object (deleted video) and retry
//! exhaustion on transport errors. Both yield [`Resolution::NoData`];
//! neither is a crash.

use crate::core::error::{AppError, AppResult};
use crate::core::retry::{retry, RetryPolicy};
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;

/// Flattened, resolved video record. Produced once per resolution call
/// and discarded after the reply cycle.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    /// Author display name, `"unknown"` when absent
    pub nickname: String,
    /// Caption text, `"no description"` when absent
    pub desc: String,
    /// Creation time as unix seconds, 0 when absent
    pub create_time: i64,
    /// Like count
    pub digg_count: u64,
    pub comment_count: u64,
    pub collect_count: u64,
    pub share_count: u64,
    /// First watermark-free play URL, `None` when the variant list is
    /// empty or truncated at any level
    pub play_url: Option<String>,
    /// Declared media size in bytes, 0 when absent
    pub data_size: u64,
}

impl VideoMetadata {
    /// Declared size rounded to whole MB, for display.
    pub fn size_mb(&self) -> u64 {
        crate::core::utils::bytes_to_mb(self.data_size)
    }

    /// Publish date rendered as `YYYY-MM-DD` (UTC). An absent timestamp
    /// renders as the epoch date.
    pub fn publish_date(&self) -> String {
        DateTime::from_timestamp(self.create_time, 0)
            .unwrap_or(DateTime::UNIX_EPOCH)
            .format("%Y-%m-%d")
            .to_string()
    }
}

/// Outcome of a resolution call.
#[derive(Debug)]
pub enum Resolution {
    /// The API produced a usable record (the play URL may still be absent).
    Resolved(VideoMetadata),
    /// No metadata: the API replied without `data`, or every attempt failed.
    NoData,
}

// Wire types. Every level optional, unknown keys ignored.

#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: Option<VideoData>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoData {
    author: Option<Author>,
    desc: Option<String>,
    create_time: Option<i64>,
    statistics: Option<Statistics>,
    video: Option<VideoStreams>,
}

#[derive(Debug, Deserialize)]
struct Author {
    nickname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Statistics {
    digg_count: Option<u64>,
    comment_count: Option<u64>,
    collect_count: Option<u64>,
    share_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct VideoStreams {
    bit_rate: Option<Vec<BitRateVariant>>,
}

#[derive(Debug, Deserialize)]
struct BitRateVariant {
    play_addr: Option<PlayAddr>,
}

#[derive(Debug, Default, Deserialize)]
struct PlayAddr {
    url_list: Option<Vec<String>>,
    data_size: Option<u64>,
}

impl VideoData {
    /// Collapses the nested optional structure into the flat record.
    fn flatten(self) -> VideoMetadata {
        let play_addr = self
            .video
            .and_then(|v| v.bit_rate)
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|variant| variant.play_addr)
            .unwrap_or_default();

        let play_url = play_addr.url_list.unwrap_or_default().into_iter().next();
        let data_size = play_addr.data_size.unwrap_or(0);

        let statistics = self.statistics.unwrap_or_default();

        VideoMetadata {
            nickname: self
                .author
                .and_then(|a| a.nickname)
                .unwrap_or_else(|| "unknown".to_string()),
            desc: self.desc.unwrap_or_else(|| "no description".to_string()),
            create_time: self.create_time.unwrap_or(0),
            digg_count: statistics.digg_count.unwrap_or(0),
            comment_count: statistics.comment_count.unwrap_or(0),
            collect_count: statistics.collect_count.unwrap_or(0),
            share_count: statistics.share_count.unwrap_or(0),
            play_url,
            data_size,
        }
    }
}

/// Client for the video-data API with bounded fixed-delay retries.
pub struct MetadataResolver {
    client: reqwest::Client,
    endpoint: String,
    policy: RetryPolicy,
}

impl MetadataResolver {
    pub fn new(api_base_url: &str) -> Self {
        Self::with_policy(api_base_url, RetryPolicy::resolver())
    }

    pub fn with_policy(api_base_url: &str, policy: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("metadata HTTP client build should succeed");

        Self {
            client,
            endpoint: format!("{}/api/hybrid/video_data", api_base_url.trim_end_matches('/')),
            policy,
        }
    }

    /// Resolves a share link to its flattened metadata.
    ///
    /// Transport failures and non-200 statuses are retried under the
    /// policy; exhaustion degrades to [`Resolution::NoData`] rather than
    /// an error so the caller has exactly two outcomes to map.
    pub async fn resolve(&self, link: &str) -> Resolution {
        let outcome = retry(&self.policy, || self.fetch(link)).await;

        match outcome.result {
            Ok(resolution) => resolution,
            Err(e) => {
                log::warn!("Metadata resolution gave up after {} attempt(s): {}", outcome.attempts, e);
                Resolution::NoData
            }
        }
    }

    async fn fetch(&self, link: &str) -> AppResult<Resolution> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", link)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("Video-data API returned status {}", status);
            return Err(AppError::HttpStatus(status));
        }

        let body: ApiResponse = response.json().await?;
        match body.data {
            Some(data) => Ok(Resolution::Resolved(data.flatten())),
            None => {
                log::debug!("Video-data API replied without data, video gone?");
                Ok(Resolution::NoData)
            }
        }
    }
}
