use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Video
// ============================================================================

/// Metadata of a single VOD. Only the duration drives pagination.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VideoInfo {
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "lengthSeconds")]
    pub length_seconds: u64,
    pub title: String,
    #[serde(default)]
    pub creator: Option<Creator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Creator {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

// ============================================================================
// Comments
// ============================================================================

/// One chat message as returned by the comment feed, with its resume cursor.
///
/// Serialized verbatim into the cache document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommentEdge {
    pub cursor: String,
    pub node: CommentNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommentNode {
    #[serde(rename = "contentOffsetSeconds")]
    pub content_offset_seconds: u64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl CommentEdge {
    pub fn offset(&self) -> u64 {
        self.node.content_offset_seconds
    }
}

/// A single page of the comment feed. Edges are non-decreasing by offset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Page {
    pub edges: Vec<CommentEdge>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
}

impl Page {
    pub fn has_next_page(&self) -> bool {
        self.page_info.has_next_page
    }
}

/// The full, ordered comment history of a video.
pub type CommentSet = Vec<CommentEdge>;
