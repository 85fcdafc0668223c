//! Segment Scheduler: fans a video out into segments and merges the results.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::info;

use crate::client::CommentSource;
use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::model::{CommentSet, VideoInfo};
use crate::paginator::{collect_segment, SegmentComments};
use crate::segment::{segments_for, Segment};

/// Counting permit set bounding how many segments are walked at once.
///
/// Permits are guards; dropping one (on success, error or cancellation)
/// hands it back.
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Semaphore,
}

impl ConcurrencyLimiter {
    pub fn new(permits: usize) -> Self {
        Self {
            semaphore: Semaphore::new(permits),
        }
    }

    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| Error::LimiterClosed)
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

pub struct SegmentScheduler {
    source: Arc<dyn CommentSource>,
    limiter: ConcurrencyLimiter,
    segment_width: u64,
}

impl SegmentScheduler {
    pub fn new(source: Arc<dyn CommentSource>, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            limiter: ConcurrencyLimiter::new(config.max_concurrent),
            segment_width: config.segment_width,
        })
    }

    pub fn source(&self) -> &dyn CommentSource {
        self.source.as_ref()
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn segments(&self, video: &VideoInfo) -> Result<Vec<Segment>> {
        segments_for(video.length_seconds, self.segment_width)
    }

    /// Walk every segment of `video` and return the per-segment results in
    /// segment order, whatever order they finished in.
    ///
    /// The first failing segment fails the whole call; segments still in
    /// flight are dropped. `progress` receives `(done, total)` after each
    /// segment completes.
    pub async fn collect_segments<F>(
        &self,
        video_id: &str,
        video: &VideoInfo,
        progress: F,
    ) -> Result<Vec<SegmentComments>>
    where
        F: Fn(usize, usize) + Sync,
    {
        let segments = self.segments(video)?;
        let total = segments.len();
        let done = AtomicUsize::new(0);
        let done = &done;
        let progress = &progress;

        let tasks = segments.into_iter().map(|segment| async move {
            let _permit = self.limiter.acquire().await?;
            let result = collect_segment(self.source.as_ref(), video_id, segment).await?;
            progress(done.fetch_add(1, Ordering::SeqCst) + 1, total);
            Ok::<_, Error>(result)
        });

        try_join_all(tasks).await
    }

    /// Collect the complete comment set of `video`.
    pub async fn collect_all(&self, video_id: &str, video: &VideoInfo) -> Result<CommentSet> {
        self.collect_all_with_progress(video_id, video, |_, _| {})
            .await
    }

    pub async fn collect_all_with_progress<F>(
        &self,
        video_id: &str,
        video: &VideoInfo,
        progress: F,
    ) -> Result<CommentSet>
    where
        F: Fn(usize, usize) + Sync,
    {
        let segments = self.collect_segments(video_id, video, progress).await?;
        let segment_count = segments.len();
        let comments: CommentSet = segments
            .into_iter()
            .flat_map(|segment| segment.comments)
            .collect();

        info!(
            "Collected {} comments from {} segments",
            comments.len(),
            segment_count
        );
        Ok(comments)
    }
}
