use serde::{Deserialize, Serialize};
use thiserror::Error;

mod layout;
pub use layout::*;
mod playback;
pub use playback::*;
mod ruler;
pub use ruler::*;
mod scrub;
pub use scrub::*;

#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("invalid duration for segment {id}: {duration}")]
    InvalidDuration { id: String, duration: f64 },
    #[error("invalid time: {0}")]
    InvalidTime(f64),
    #[error("segment not found: {0}")]
    SegmentNotFound(String),
}

pub type Seconds = f64; // wall-clock seconds from the start of the sequence

/// Anything laid out back to back on the scene timeline.
pub trait Segment {
    fn segment_id(&self) -> &str;
    fn duration_secs(&self) -> Seconds;
}

/// Minimal owned segment, handy when only ids and durations are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRef {
    pub id: String,
    pub duration: Seconds,
}

impl SegmentRef {
    pub fn new(id: impl Into<String>, duration: Seconds) -> Self {
        Self {
            id: id.into(),
            duration,
        }
    }
}

impl Segment for SegmentRef {
    fn segment_id(&self) -> &str {
        &self.id
    }

    fn duration_secs(&self) -> Seconds {
        self.duration
    }
}

impl<T: Segment + ?Sized> Segment for &T {
    fn segment_id(&self) -> &str {
        (**self).segment_id()
    }

    fn duration_secs(&self) -> Seconds {
        (**self).duration_secs()
    }
}
