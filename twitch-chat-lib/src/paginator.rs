//! Segment Paginator: walks the comment feed inside one time window.
//!
//! The walk starts at the window's offset and follows cursors page by page.
//! Each window re-fetches independently near its boundaries, so windows never
//! depend on one another and can run in parallel.

use serde::Serialize;
use tracing::debug;

use crate::client::{CommentSource, PageQuery};
use crate::error::Result;
use crate::model::{CommentEdge, Page};
use crate::segment::Segment;

/// Why a segment walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// A page came back with no edges.
    EmptyPage,
    /// The last edge of a page lies beyond the window end.
    WindowPassed,
    /// The feed reported no further page.
    NoNextPage,
}

/// Comments collected for one segment, in feed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentComments {
    pub segment: Segment,
    pub comments: Vec<CommentEdge>,
    pub pages_fetched: usize,
    pub stop: StopReason,
}

#[derive(Debug, PartialEq, Eq)]
enum State {
    Fetching(PageQuery),
    Scanning(Page),
    Exhausted(StopReason),
    WindowPassed,
}

/// Scan one page into `out` and decide what happens next.
///
/// Scanning stops at the first edge at or past `segment.end`; edges after it
/// are not looked at. Fetching stops only when the page's *last* edge is
/// strictly past the end or the feed has no next page.
fn scan_page(segment: Segment, page: Page, out: &mut Vec<CommentEdge>) -> State {
    let has_next_page = page.has_next_page();
    let (last_offset, last_cursor) = match page.edges.last() {
        Some(last) => (last.offset(), last.cursor.clone()),
        None => return State::Exhausted(StopReason::EmptyPage),
    };

    for edge in page.edges {
        let offset = edge.offset();
        if offset >= segment.end {
            break;
        }
        if segment.contains(offset) {
            out.push(edge);
        }
    }

    if last_offset > segment.end {
        State::WindowPassed
    } else if !has_next_page {
        State::Exhausted(StopReason::NoNextPage)
    } else {
        State::Fetching(PageQuery::Cursor(last_cursor))
    }
}

/// Collect every comment whose offset falls inside `segment`.
pub async fn collect_segment<S>(
    source: &S,
    video_id: &str,
    segment: Segment,
) -> Result<SegmentComments>
where
    S: CommentSource + ?Sized,
{
    let mut comments = Vec::new();
    let mut pages_fetched = 0;
    let mut state = State::Fetching(PageQuery::Offset(segment.start));

    let stop = loop {
        state = match state {
            State::Fetching(query) => {
                let page = source.fetch_page(video_id, &query).await?;
                pages_fetched += 1;
                State::Scanning(page)
            }
            State::Scanning(page) => scan_page(segment, page, &mut comments),
            State::Exhausted(reason) => break reason,
            State::WindowPassed => break StopReason::WindowPassed,
        };
    };

    debug!(
        "Segment [{}, {}): {} comments from {} pages ({:?})",
        segment.start,
        segment.end,
        comments.len(),
        pages_fetched,
        stop
    );

    Ok(SegmentComments {
        segment,
        comments,
        pages_fetched,
        stop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageInfo;
    use crate::testing::{edge, FakeFeed};

    const WINDOW: Segment = Segment { start: 0, end: 60 };

    fn page(offsets: &[u64], has_next_page: bool) -> Page {
        Page {
            edges: offsets.iter().map(|&o| edge(o)).collect(),
            page_info: PageInfo { has_next_page },
        }
    }

    fn offsets(edges: &[CommentEdge]) -> Vec<u64> {
        edges.iter().map(|e| e.offset()).collect()
    }

    #[test]
    fn test_scan_empty_page() {
        let mut out = Vec::new();
        let state = scan_page(WINDOW, page(&[], true), &mut out);
        assert_eq!(state, State::Exhausted(StopReason::EmptyPage));
        assert!(out.is_empty());
    }

    #[test]
    fn test_scan_stops_at_boundary_mid_page() {
        // Out-of-order tail proves the scan never looks past the first edge at `end`.
        let mut out = Vec::new();
        let state = scan_page(WINDOW, page(&[10, 59, 60, 5], true), &mut out);
        assert_eq!(offsets(&out), vec![10, 59]);
        assert_eq!(state, State::Fetching(PageQuery::Cursor("c5".to_string())));
    }

    #[test]
    fn test_scan_last_edge_past_window() {
        let mut out = Vec::new();
        let state = scan_page(WINDOW, page(&[10, 59, 60, 61], true), &mut out);
        assert_eq!(offsets(&out), vec![10, 59]);
        assert_eq!(state, State::WindowPassed);
    }

    #[test]
    fn test_scan_last_edge_on_boundary_keeps_fetching() {
        let mut out = Vec::new();
        let state = scan_page(WINDOW, page(&[30, 60], true), &mut out);
        assert_eq!(offsets(&out), vec![30]);
        assert_eq!(state, State::Fetching(PageQuery::Cursor("c60".to_string())));
    }

    #[test]
    fn test_scan_no_next_page() {
        let mut out = Vec::new();
        let state = scan_page(WINDOW, page(&[1, 2], false), &mut out);
        assert_eq!(offsets(&out), vec![1, 2]);
        assert_eq!(state, State::Exhausted(StopReason::NoNextPage));
    }

    #[test]
    fn test_scan_skips_edges_before_window() {
        let window = Segment { start: 60, end: 120 };
        let mut out = Vec::new();
        scan_page(window, page(&[58, 59, 60, 61], true), &mut out);
        assert_eq!(offsets(&out), vec![60, 61]);
    }

    #[tokio::test]
    async fn test_empty_segment_issues_single_fetch() {
        let feed = FakeFeed::new(&[], 4);
        let result = collect_segment(&feed, "1", Segment { start: 0, end: 60 })
            .await
            .unwrap();

        assert!(result.comments.is_empty());
        assert_eq!(result.pages_fetched, 1);
        assert_eq!(feed.calls(), 1);
    }

    #[tokio::test]
    async fn test_follows_cursors_across_pages() {
        let feed = FakeFeed::new(&[1, 5, 9, 20, 30, 41, 50, 59, 60, 70], 3);
        let result = collect_segment(&feed, "1", Segment { start: 0, end: 60 })
            .await
            .unwrap();

        assert_eq!(offsets(&result.comments), vec![1, 5, 9, 20, 30, 41, 50, 59]);
        assert_eq!(result.stop, StopReason::WindowPassed);
        assert_eq!(result.pages_fetched, 4);
    }

    #[tokio::test]
    async fn test_boundary_record_excluded() {
        let feed = FakeFeed::new(&[10, 60], 10);
        let first = collect_segment(&feed, "1", Segment { start: 0, end: 60 })
            .await
            .unwrap();
        let second = collect_segment(&feed, "1", Segment { start: 60, end: 120 })
            .await
            .unwrap();

        assert_eq!(offsets(&first.comments), vec![10]);
        assert_eq!(offsets(&second.comments), vec![60]);
        assert_eq!(second.stop, StopReason::NoNextPage);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let feed = FakeFeed::new(&[1, 2, 3], 1).fail_at_offset(0);
        let err = collect_segment(&feed, "1", Segment { start: 0, end: 60 })
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Request { status: 500, .. }));
    }
}
