//! Reply templating. Pure string formatting, no business logic.

use crate::resolve::VideoMetadata;

/// Summary sent before the video file itself.
pub fn video_summary(meta: &VideoMetadata, play_link: &str) -> String {
    format!(
        "Douyin video:\nauthor: {}, published: {}, size: {} MB\nlikes: {}, comments: {}, favorites: {}, shares: {}\ndescription: {}\nwatermark-free link: {}",
        meta.nickname,
        meta.publish_date(),
        meta.size_mb(),
        meta.digg_count,
        meta.comment_count,
        meta.collect_count,
        meta.share_count,
        meta.desc,
        play_link
    )
}

/// The API had no record of the video.
pub fn no_metadata() -> String {
    "Sorry! No video information found. The video may have been deleted.".to_string()
}

/// Metadata resolved but no play URL anywhere in the variant list.
pub fn no_play_url() -> String {
    "Sorry! No video link found, please try again later.".to_string()
}

/// The media is over the configured size cap.
pub fn size_exceeded(size_mb: u64, limit_mb: u64) -> String {
    format!("Video size {} MB exceeds the {} MB limit", size_mb, limit_mb)
}

/// Download retries ran out.
pub fn download_failed() -> String {
    "Video download failed. Please try again later.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_meta() -> VideoMetadata {
        VideoMetadata {
            nickname: "dancer".to_string(),
            desc: "sunset dance".to_string(),
            create_time: 1_700_000_000,
            digg_count: 12,
            comment_count: 3,
            collect_count: 4,
            share_count: 5,
            play_url: Some("https://cdn.example.com/v.mp4".to_string()),
            data_size: 10 * 1024 * 1024,
        }
    }

    #[test]
    fn test_video_summary() {
        let text = video_summary(&sample_meta(), "https://s.example.com/x9k");
        assert_eq!(
            text,
            "Douyin video:\nauthor: dancer, published: 2023-11-14, size: 10 MB\nlikes: 12, comments: 3, favorites: 4, shares: 5\ndescription: sunset dance\nwatermark-free link: https://s.example.com/x9k"
        );
    }

    #[test]
    fn test_video_summary_with_defaults() {
        let meta = VideoMetadata {
            nickname: "unknown".to_string(),
            desc: "no description".to_string(),
            create_time: 0,
            digg_count: 0,
            comment_count: 0,
            collect_count: 0,
            share_count: 0,
            play_url: None,
            data_size: 0,
        };
        let text = video_summary(&meta, "https://cdn.example.com/v.mp4");
        assert!(text.contains("author: unknown"));
        assert!(text.contains("published: 1970-01-01"));
        assert!(text.contains("size: 0 MB"));
    }

    #[test]
    fn test_size_exceeded_text() {
        assert_eq!(size_exceeded(62, 50), "Video size 62 MB exceeds the 50 MB limit");
    }
}
