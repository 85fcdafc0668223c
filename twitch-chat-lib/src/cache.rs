//! On-disk comment cache, one JSON document per video.
//!
//! All-or-nothing: a present document is trusted verbatim, with no staleness
//! check and no per-segment entries.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::info;

use crate::client::validate_video_id;
use crate::error::Result;
use crate::model::{CommentEdge, CommentSet};

pub const DEFAULT_CACHE_DIR: &str = "__cache";

#[derive(Debug, Clone)]
pub struct CommentCache {
    dir: PathBuf,
}

impl Default for CommentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}

impl CommentCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", video_id))
    }

    /// Returns `None` when nothing is cached. A document that does not parse
    /// is an error, not a miss.
    pub async fn load(&self, video_id: &str) -> Result<Option<CommentSet>> {
        validate_video_id(video_id)?;
        let path = self.path_for(video_id);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let comments: CommentSet = serde_json::from_slice(&bytes)?;
        info!(
            "Loaded {} cached comments from {}",
            comments.len(),
            path.display()
        );
        Ok(Some(comments))
    }

    pub async fn store(&self, video_id: &str, comments: &[CommentEdge]) -> Result<()> {
        validate_video_id(video_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(video_id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(comments)?;

        // Rename so a crash mid-write cannot leave a truncated document behind.
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        info!("Cached {} comments to {}", comments.len(), path.display());
        Ok(())
    }
}
