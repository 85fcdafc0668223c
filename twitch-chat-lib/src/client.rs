//! Data Client: the only code that talks to the GraphQL endpoint.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::model::{Page, VideoInfo};

const COMMENTS_OPERATION: &str = "VideoCommentsByOffsetOrCursor";

// ============================================================================
// Public Types
// ============================================================================

/// Where a comment page starts: at a time offset, or right after a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageQuery {
    Offset(u64),
    Cursor(String),
}

impl PageQuery {
    /// Build a query from loosely typed inputs.
    ///
    /// At least one of `offset`/`cursor` is required. When both are given the
    /// offset is used.
    pub fn new(offset: Option<u64>, cursor: Option<String>) -> Result<Self> {
        match (offset, cursor) {
            (Some(offset), _) => Ok(Self::Offset(offset)),
            (None, Some(cursor)) => Ok(Self::Cursor(cursor)),
            (None, None) => Err(Error::InvalidArgument(
                "a comment page needs either an offset or a cursor".to_string(),
            )),
        }
    }
}

/// Anything that can serve comment pages and video metadata.
///
/// [`GqlClient`] is the network implementation; tests use in-memory fakes.
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_page(&self, video_id: &str, query: &PageQuery) -> Result<Page>;

    async fn fetch_video_info(&self, video_id: &str) -> Result<VideoInfo>;
}

// ============================================================================
// Internal API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GqlError>>,
}

#[derive(Debug, Deserialize)]
struct GqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct VideoData<T> {
    video: Option<T>,
}

#[derive(Debug, Deserialize)]
struct VideoComments {
    comments: Option<Page>,
}

// ============================================================================
// Request / Response Helpers
// ============================================================================

/// Video ids are interpolated into an inline query, so only digits pass.
pub fn validate_video_id(video_id: &str) -> Result<()> {
    if video_id.is_empty() || !video_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidArgument(format!(
            "video id must be numeric, got {:?}",
            video_id
        )));
    }
    Ok(())
}

pub fn video_info_request_body(video_id: &str) -> Value {
    let query = format!(
        r#"query {{
    video(id: "{}") {{
        creator {{
            displayName
            id
        }}
        createdAt
        lengthSeconds
        title
    }}
}}"#,
        video_id
    );
    json!({ "query": query })
}

pub fn comments_request_body(video_id: &str, query: &PageQuery, query_hash: &str) -> Value {
    let mut variables = json!({ "videoID": video_id });
    match query {
        PageQuery::Offset(offset) => variables["contentOffsetSeconds"] = json!(offset),
        PageQuery::Cursor(cursor) => variables["cursor"] = json!(cursor),
    }

    json!({
        "operationName": COMMENTS_OPERATION,
        "variables": variables,
        "extensions": {
            "persistedQuery": {
                "version": 1,
                "sha256Hash": query_hash,
            }
        }
    })
}

/// Unwrap `data.video` from a GraphQL response body.
fn extract_video<T: DeserializeOwned>(body: &str) -> Result<T> {
    let response: GqlResponse<VideoData<T>> =
        serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))?;

    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(Error::MalformedResponse(format!(
            "GraphQL errors: {}",
            messages.join("; ")
        )));
    }

    response
        .data
        .and_then(|data| data.video)
        .ok_or_else(|| Error::MalformedResponse("response has no video".to_string()))
}

pub fn parse_video_info(body: &str) -> Result<VideoInfo> {
    extract_video(body)
}

pub fn parse_comments_page(body: &str) -> Result<Page> {
    let video: VideoComments = extract_video(body)?;
    video
        .comments
        .ok_or_else(|| Error::MalformedResponse("video has no comments field".to_string()))
}

// ============================================================================
// GraphQL Client
// ============================================================================

/// GraphQL client for the Twitch comment feed.
///
/// Construct once and share; every request carries the client id header and
/// is bounded by the configured timeout. Nothing is retried here.
#[derive(Debug, Clone)]
pub struct GqlClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GqlClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client_id = HeaderValue::from_str(&config.client_id).map_err(|_| {
            Error::InvalidArgument(format!("invalid client id: {:?}", config.client_id))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert("Client-ID", client_id);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, config })
    }

    async fn do_request(&self, body: &Value) -> Result<String> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Request {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl CommentSource for GqlClient {
    async fn fetch_page(&self, video_id: &str, query: &PageQuery) -> Result<Page> {
        let body = comments_request_body(video_id, query, &self.config.persisted_query_hash);
        let text = self.do_request(&body).await?;
        let page = parse_comments_page(&text)?;

        debug!(
            "Fetched {} comments for {:?} (has next page: {})",
            page.edges.len(),
            query,
            page.has_next_page()
        );
        Ok(page)
    }

    async fn fetch_video_info(&self, video_id: &str) -> Result<VideoInfo> {
        validate_video_id(video_id)?;
        let text = self.do_request(&video_info_request_body(video_id)).await?;
        let video = parse_video_info(&text)?;

        info!(
            "Got video {}: {:?} ({}s)",
            video_id, video.title, video.length_seconds
        );
        Ok(video)
    }
}
