//! Asset-cache housekeeping.
//!
//! Downloaded media lands in one local directory; the janitor bounds its
//! growth by pruning before every new download, so the cache never grows
//! by more than one file per handled message. Two interchangeable
//! policies exist because both are in active use: keep the newest K
//! files, or drop everything older than a retention window.
//!
//! Pruning runs to completion before the next destination file is
//! created, so an in-flight download is never a deletion candidate.
//! Filesystem hiccups (file vanished, permission lost) are logged and
//! skipped; cleanup must never take the pipeline down.

use crate::core::utils::{escape_filename, truncate_chars};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// How many characters of the description survive into the file name.
const SLUG_MAX_CHARS: usize = 20;

/// Retention strategy for the asset directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Retain the newest K media files, delete the remainder.
    KeepNewest(usize),
    /// Delete media files older than the given number of days.
    MaxAgeDays(u64),
}

/// Prunes the asset directory according to a retention policy.
pub struct AssetJanitor {
    dir: PathBuf,
    policy: RetentionPolicy,
}

impl AssetJanitor {
    pub fn new(dir: impl Into<PathBuf>, policy: RetentionPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }

    /// Deletes expired media files and returns how many were removed.
    ///
    /// Never fails: listing or deletion errors are logged and the rest
    /// of the sweep continues.
    pub fn prune(&self) -> usize {
        let files = self.media_files();
        let doomed = select_expired(&files, self.policy, SystemTime::now());

        let mut removed = 0;
        for path in doomed {
            match fs::remove_file(&path) {
                Ok(()) => {
                    log::debug!("Removed expired asset: {}", path.display());
                    removed += 1;
                }
                Err(e) => {
                    log::warn!("Failed to remove asset {}: {}", path.display(), e);
                }
            }
        }
        removed
    }

    /// Lists `.mp4` files in the asset directory with their mtimes.
    fn media_files(&self) -> Vec<(PathBuf, SystemTime)> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot list asset directory {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("mp4") {
                continue;
            }
            match entry.metadata().and_then(|m| m.modified()) {
                Ok(mtime) => files.push((path, mtime)),
                Err(e) => {
                    log::warn!("Cannot stat asset {}: {}", path.display(), e);
                }
            }
        }
        files
    }
}

/// Pure policy core: which of `files` should be deleted at time `now`.
///
/// Separated from the filesystem walk so retention behavior is testable
/// with synthetic timestamps.
pub fn select_expired(
    files: &[(PathBuf, SystemTime)],
    policy: RetentionPolicy,
    now: SystemTime,
) -> Vec<PathBuf> {
    match policy {
        RetentionPolicy::KeepNewest(k) => {
            let mut sorted: Vec<_> = files.to_vec();
            sorted.sort_by(|a, b| b.1.cmp(&a.1));
            sorted.into_iter().skip(k).map(|(path, _)| path).collect()
        }
        RetentionPolicy::MaxAgeDays(days) => {
            let cutoff = now - Duration::from_secs(days * 24 * 60 * 60);
            files
                .iter()
                .filter(|(_, mtime)| *mtime < cutoff)
                .map(|(path, _)| path.clone())
                .collect()
        }
    }
}

/// Builds the asset file name: `<unix-timestamp>-<description-slug>.mp4`.
///
/// The timestamp prefix keeps concurrent messages from colliding on the
/// same description; the slug is filesystem-safe, space-free and capped
/// at a character (not byte) boundary.
pub fn asset_file_name(desc: &str, timestamp: i64) -> String {
    let escaped = escape_filename(desc).replace(' ', "");
    let slug = truncate_chars(&escaped, SLUG_MAX_CHARS);
    format!("{}-{}.mp4", timestamp, slug)
}
