//! Host-channel seam: the reply types the pipeline emits and the trait
//! the hosting chat framework implements to deliver them.
//!
//! Sending is fire-and-forget from the pipeline's point of view, but the
//! wrapper retries transient failures on its own: up to 2 retries with a
//! linearly increasing wait (3s, then 6s). A `NotImplemented` error
//! means the host cannot deliver that reply type at all; it is skipped
//! silently, not retried.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Maximum retries for one outbound reply.
pub const SEND_MAX_RETRIES: u32 = 2;

/// Base wait before the first send retry; the second waits twice this.
pub const SEND_RETRY_BASE_DELAY: Duration = Duration::from_secs(3);

/// A reply destined for the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text message
    Text(String),
    /// Local path of a video file to upload
    Video(PathBuf),
}

/// Errors a host channel may report from `send`.
#[derive(Debug, Error)]
pub enum SendError {
    /// The channel does not support this reply type
    #[error("reply type not supported by the host channel")]
    NotImplemented,

    /// Any other delivery failure
    #[error("send failed: {0}")]
    Failed(String),
}

/// Delivery seam implemented by the hosting chat framework.
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    async fn send(&self, reply: Reply) -> Result<(), SendError>;
}

/// Sends a reply with the standard retry schedule.
///
/// Never returns an error: a reply the host cannot deliver is logged and
/// dropped rather than taking the message handler down.
pub async fn send_with_retry(channel: &dyn ReplyChannel, reply: Reply) {
    send_with_retry_after(channel, reply, SEND_RETRY_BASE_DELAY).await;
}

pub(crate) async fn send_with_retry_after(channel: &dyn ReplyChannel, reply: Reply, base_delay: Duration) {
    for attempt in 0..=SEND_MAX_RETRIES {
        match channel.send(reply.clone()).await {
            Ok(()) => return,
            Err(SendError::NotImplemented) => {
                log::debug!("Host channel does not support this reply type, skipping");
                return;
            }
            Err(e) => {
                log::error!("Send failed: {}", e);
                if attempt < SEND_MAX_RETRIES {
                    let delay = base_delay * (attempt + 1);
                    log::warn!(
                        "Retrying send in {:?} (retry {}/{})",
                        delay,
                        attempt + 1,
                        SEND_MAX_RETRIES
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    log::error!("Giving up on reply after {} retries", SEND_MAX_RETRIES);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Channel that fails a configurable number of times before accepting.
    struct FlakyChannel {
        failures_left: AtomicU32,
        delivered: Mutex<Vec<Reply>>,
    }

    impl FlakyChannel {
        fn new(failures: u32) -> Self {
            Self {
                failures_left: AtomicU32::new(failures),
                delivered: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReplyChannel for FlakyChannel {
        async fn send(&self, reply: Reply) -> Result<(), SendError> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(SendError::Failed("connection dropped".to_string()));
            }
            self.delivered.lock().unwrap().push(reply);
            Ok(())
        }
    }

    struct UnsupportedChannel {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ReplyChannel for UnsupportedChannel {
        async fn send(&self, _reply: Reply) -> Result<(), SendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SendError::NotImplemented)
        }
    }

    #[tokio::test]
    async fn test_send_succeeds_first_try() {
        let channel = FlakyChannel::new(0);
        send_with_retry_after(&channel, Reply::Text("hi".to_string()), Duration::from_millis(5)).await;
        assert_eq!(channel.delivered.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_retries_transient_failures() {
        let channel = FlakyChannel::new(2);
        send_with_retry_after(&channel, Reply::Text("hi".to_string()), Duration::from_millis(5)).await;
        assert_eq!(channel.delivered.lock().unwrap().len(), 1);
        assert_eq!(channel.failures_left.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_gives_up_after_retry_budget() {
        let channel = FlakyChannel::new(10);
        send_with_retry_after(&channel, Reply::Text("hi".to_string()), Duration::from_millis(5)).await;
        assert!(channel.delivered.lock().unwrap().is_empty());
        // 1 initial + 2 retries consumed
        assert_eq!(channel.failures_left.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_not_implemented_is_skipped_without_retry() {
        let channel = UnsupportedChannel {
            calls: AtomicU32::new(0),
        };
        send_with_retry_after(
            &channel,
            Reply::Video(PathBuf::from("/tmp/clip.mp4")),
            Duration::from_millis(5),
        )
        .await;
        assert_eq!(channel.calls.load(Ordering::SeqCst), 1);
    }
}
