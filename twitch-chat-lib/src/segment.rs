use serde::Serialize;

use crate::error::{Error, Result};

/// A half-open window `[start, end)` of video time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
}

impl Segment {
    pub fn contains(&self, offset: u64) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Tile `[0, duration)` with width-aligned segments. The last one is cut at
/// `duration` rather than padded.
pub fn segments_for(duration: u64, width: u64) -> Result<Vec<Segment>> {
    if width == 0 {
        return Err(Error::InvalidArgument(
            "segment width must be at least one second".to_string(),
        ));
    }

    Ok((0..duration)
        .step_by(width as usize)
        .map(|start| Segment {
            start,
            end: start.saturating_add(width).min(duration),
        })
        .collect())
}
