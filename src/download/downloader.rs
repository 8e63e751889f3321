//! Streamed media download with a size cap and bounded retries.
//!
//! The declared size from resolution metadata is checked before any
//! bytes move (byte-precise: one byte over the limit is rejected), and
//! the cap is enforced again while streaming in case the API lied. Every
//! retry restarts the GET from scratch (no partial resume) with a
//! fixed wait between attempts. The request timeout is generous because
//! a full-length clip over a slow CDN can take minutes.

use crate::core::error::AppError;
use crate::core::retry::{retry, RetryError, RetryPolicy, Retryable};
use crate::core::utils::bytes_to_mb;
use futures_util::StreamExt;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Whole-request timeout for one download attempt.
const DOWNLOAD_TIMEOUT_SECS: u64 = 200;

/// Terminal download failures, each mapped to its own user-facing reply.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The media is over the configured cap; no transfer was made (or
    /// the stream blew past the cap and the partial file was removed).
    #[error("video size {size_mb} MB exceeds the {limit_mb} MB limit")]
    SizeExceeded { size_mb: u64, limit_mb: u64 },

    /// Every attempt failed on transport or status.
    #[error("download failed after {attempts} attempt(s)")]
    RetryExhausted { attempts: u32 },
}

/// Per-attempt failure. Oversize aborts must not be retried; the file
/// will not shrink on the next attempt.
#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    Transport(#[from] AppError),

    #[error("stream exceeded the size cap at {0} bytes")]
    TooLarge(u64),
}

impl Retryable for AttemptError {
    fn is_retryable(&self) -> bool {
        match self {
            AttemptError::Transport(e) => e.is_retryable(),
            AttemptError::TooLarge(_) => false,
        }
    }
}

/// Streams media to the asset directory under a size cap.
pub struct Downloader {
    client: reqwest::Client,
    policy: RetryPolicy,
    limit_bytes: u64,
}

impl Downloader {
    pub fn new(limit_size_mb: u64) -> Self {
        Self::with_policy(limit_size_mb, RetryPolicy::downloader())
    }

    pub fn with_policy(limit_size_mb: u64, policy: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; douclip/0.3)")
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("download HTTP client build should succeed");

        Self {
            client,
            policy,
            limit_bytes: limit_size_mb * 1024 * 1024,
        }
    }

    fn limit_mb(&self) -> u64 {
        self.limit_bytes / (1024 * 1024)
    }

    /// Downloads `url` to `dest`.
    ///
    /// `declared_size` is the byte size reported by resolution metadata;
    /// when it exceeds the cap the streaming GET is never issued. On
    /// success a complete file sits at `dest`; after `RetryExhausted` a
    /// partial file may remain and the caller must not act on it.
    pub async fn download(&self, url: &str, dest: &Path, declared_size: u64) -> Result<(), DownloadError> {
        if declared_size > self.limit_bytes {
            log::debug!(
                "Declared size {} MB is over the {} MB limit, skipping transfer",
                bytes_to_mb(declared_size),
                self.limit_mb()
            );
            return Err(DownloadError::SizeExceeded {
                size_mb: bytes_to_mb(declared_size),
                limit_mb: self.limit_mb(),
            });
        }

        log::info!("📥 Downloading media to {}", dest.display());
        let outcome = retry(&self.policy, || self.attempt(url, dest)).await;

        match outcome.result {
            Ok(bytes) => {
                log::info!(
                    "✅ Download complete: {} ({:.2} MB)",
                    dest.display(),
                    bytes as f64 / (1024.0 * 1024.0)
                );
                Ok(())
            }
            Err(RetryError::AttemptsExhausted {
                last_error: AttemptError::TooLarge(written),
                ..
            }) => Err(DownloadError::SizeExceeded {
                size_mb: bytes_to_mb(written),
                limit_mb: self.limit_mb(),
            }),
            Err(RetryError::AttemptsExhausted { last_error, .. }) => {
                log::error!("Download failed after {} attempt(s): {}", outcome.attempts, last_error);
                Err(DownloadError::RetryExhausted {
                    attempts: outcome.attempts,
                })
            }
        }
    }

    /// One full streamed GET. `File::create` truncates whatever a
    /// previous attempt left behind.
    async fn attempt(&self, url: &str, dest: &Path) -> Result<u64, AttemptError> {
        let response = self.client.get(url).send().await.map_err(AppError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus(status).into());
        }

        let mut file = std::fs::File::create(dest).map_err(AppError::from)?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(AppError::from)?;
            file.write_all(&chunk).map_err(AppError::from)?;
            written += chunk.len() as u64;

            if written > self.limit_bytes {
                drop(file);
                let _ = std::fs::remove_file(dest);
                return Err(AttemptError::TooLarge(written));
            }
        }

        file.flush().map_err(AppError::from)?;
        Ok(written)
    }
}
