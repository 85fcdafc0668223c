//! Library for downloading the chat replay of a Twitch VOD
//!
//! This library handles:
//! - Fetching video metadata and comment pages from the GraphQL API
//! - Splitting a video into fixed-width time segments
//! - Paginating each segment concurrently under a permit limit
//! - Caching the merged comment list on disk

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod paginator;
pub mod scheduler;
pub mod segment;

#[cfg(test)]
mod testing;

pub use cache::CommentCache;
pub use client::{CommentSource, GqlClient, PageQuery};
pub use config::{ClientConfig, SchedulerConfig};
pub use error::{Error, Result};
pub use model::{CommentEdge, CommentNode, CommentSet, Page, PageInfo, VideoInfo};
pub use paginator::{collect_segment, SegmentComments, StopReason};
pub use scheduler::{ConcurrencyLimiter, SegmentScheduler};
pub use segment::{segments_for, Segment};

// ============================================================================
// High-Level API
// ============================================================================

/// Return the full comment set of a video, from the cache when possible.
///
/// On a cache hit no request is made at all. On a miss this:
/// 1. Fetches the video metadata for its duration
/// 2. Collects every segment through `scheduler`
/// 3. Stores the merged set, only after every segment succeeded
///
/// `progress` receives `(segments_done, total_segments)`.
pub async fn fetch_comments_cached<F>(
    scheduler: &SegmentScheduler,
    cache: &CommentCache,
    video_id: &str,
    progress: F,
) -> Result<CommentSet>
where
    F: Fn(usize, usize) + Sync,
{
    if let Some(comments) = cache.load(video_id).await? {
        return Ok(comments);
    }

    let video = scheduler.source().fetch_video_info(video_id).await?;
    let comments = scheduler
        .collect_all_with_progress(video_id, &video, progress)
        .await?;
    cache.store(video_id, &comments).await?;

    Ok(comments)
}
