//! In-memory comment feed for exercising the paginator and scheduler.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::client::{CommentSource, PageQuery};
use crate::error::{Error, Result};
use crate::model::{CommentEdge, CommentNode, Page, PageInfo, VideoInfo};

pub fn edge(offset: u64) -> CommentEdge {
    CommentEdge {
        cursor: format!("c{}", offset),
        node: CommentNode {
            content_offset_seconds: offset,
            created_at: chrono::DateTime::from_timestamp(1_700_000_000 + offset as i64, 0)
                .unwrap(),
        },
    }
}

pub fn video(length_seconds: u64) -> VideoInfo {
    VideoInfo {
        created_at: chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        length_seconds,
        title: "test vod".to_string(),
        creator: None,
    }
}

/// Serves a sorted list of comments in fixed-size pages. Offsets must be unique
/// since cursors are derived from them.
pub struct FakeFeed {
    edges: Vec<CommentEdge>,
    page_size: usize,
    fail_offset: Option<u64>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFeed {
    pub fn new(offsets: &[u64], page_size: usize) -> Self {
        Self {
            edges: offsets.iter().map(|&o| edge(o)).collect(),
            page_size,
            fail_offset: None,
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Answer offset queries for `offset` with an HTTP 500.
    pub fn fail_at_offset(mut self, offset: u64) -> Self {
        self.fail_offset = Some(offset);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn page_from(&self, start: usize) -> Page {
        let end = (start + self.page_size).min(self.edges.len());
        Page {
            edges: self.edges[start..end].to_vec(),
            page_info: PageInfo {
                has_next_page: end < self.edges.len(),
            },
        }
    }

    fn serve(&self, query: &PageQuery) -> Result<Page> {
        let start = match query {
            PageQuery::Offset(offset) => {
                if self.fail_offset == Some(*offset) {
                    return Err(Error::Request {
                        status: 500,
                        body: "internal error".to_string(),
                    });
                }
                self.edges.partition_point(|e| e.offset() < *offset)
            }
            PageQuery::Cursor(cursor) => {
                let index = self
                    .edges
                    .iter()
                    .position(|e| &e.cursor == cursor)
                    .ok_or_else(|| Error::MalformedResponse(format!("unknown cursor {}", cursor)))?;
                index + 1
            }
        };
        Ok(self.page_from(start))
    }
}

#[async_trait]
impl CommentSource for FakeFeed {
    async fn fetch_page(&self, _video_id: &str, query: &PageQuery) -> Result<Page> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = self.serve(query);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn fetch_video_info(&self, _video_id: &str) -> Result<VideoInfo> {
        let length = self.edges.last().map(|e| e.offset() + 1).unwrap_or(0);
        Ok(video(length))
    }
}
