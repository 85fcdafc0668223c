use std::time::Duration;

use crate::error::{Error, Result};

pub const GQL_ENDPOINT: &str = "https://gql.twitch.tv/gql";

/// Client id of the public Twitch web player.
pub const DEFAULT_CLIENT_ID: &str = "kd1unb4b3q4t58fwlpcbzcbnm76a8fp";

/// Persisted query id of `VideoCommentsByOffsetOrCursor`.
pub const COMMENTS_QUERY_HASH: &str =
    "b70a3591ff0f4e0313d126c6a1502d79a1c02baebb288227c582044aa76adf6a";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SEGMENT_WIDTH_SECS: u64 = 60;
pub const DEFAULT_MAX_CONCURRENT: usize = 20;

/// Settings for [`crate::GqlClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub client_id: String,
    pub persisted_query_hash: String,
    /// Hard limit per request; the endpoint is not trusted to answer.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: GQL_ENDPOINT.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            persisted_query_hash: COMMENTS_QUERY_HASH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Settings for [`crate::SegmentScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub segment_width: u64,
    pub max_concurrent: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            segment_width: DEFAULT_SEGMENT_WIDTH_SECS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.segment_width == 0 {
            return Err(Error::InvalidArgument(
                "segment width must be at least one second".to_string(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(Error::InvalidArgument(
                "max concurrent segments must be at least one".to_string(),
            ));
        }
        Ok(())
    }
}
