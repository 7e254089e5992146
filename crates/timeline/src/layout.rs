use crate::{Seconds, Segment, TimelineError};
use serde::{Deserialize, Serialize};

/// Placement of one segment on the sequence timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpan {
    pub id: String,
    pub index: usize,
    pub start: Seconds,
    pub duration: Seconds,
}

impl SegmentSpan {
    pub fn end(&self) -> Seconds {
        self.start + self.duration
    }

    pub fn contains(&self, time: Seconds) -> bool {
        time >= self.start && time < self.end()
    }
}

/// Cumulative start offsets of an ordered list of segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    spans: Vec<SegmentSpan>,
    total_duration: Seconds,
}

impl SceneLayout {
    /// Each start offset is the running sum of the previous durations.
    /// Negative or non-finite durations contribute nothing so offsets stay monotonic.
    pub fn compute<S: Segment>(segments: &[S]) -> Self {
        let mut spans = Vec::with_capacity(segments.len());
        let mut cursor = 0.0;
        for (index, segment) in segments.iter().enumerate() {
            let duration = sanitize(segment.duration_secs());
            spans.push(SegmentSpan {
                id: segment.segment_id().to_string(),
                index,
                start: cursor,
                duration,
            });
            cursor += duration;
        }
        Self {
            spans,
            total_duration: cursor,
        }
    }

    /// Like [`SceneLayout::compute`] but rejects zero, negative or non-finite durations.
    pub fn compute_strict<S: Segment>(segments: &[S]) -> Result<Self, TimelineError> {
        for segment in segments {
            let duration = segment.duration_secs();
            if !duration.is_finite() || duration <= 0.0 {
                return Err(TimelineError::InvalidDuration {
                    id: segment.segment_id().to_string(),
                    duration,
                });
            }
        }
        Ok(Self::compute(segments))
    }

    pub fn spans(&self) -> &[SegmentSpan] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn total_duration(&self) -> Seconds {
        self.total_duration
    }

    pub fn start_of(&self, id: &str) -> Option<Seconds> {
        self.spans.iter().find(|s| s.id == id).map(|s| s.start)
    }

    pub fn span(&self, id: &str) -> Result<&SegmentSpan, TimelineError> {
        self.spans
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| TimelineError::SegmentNotFound(id.to_string()))
    }

    /// Index of the last segment whose start offset is <= `time`.
    pub fn active_index_at(&self, time: Seconds) -> Option<usize> {
        // Linear scan; a project holds a handful of scenes.
        self.spans
            .iter()
            .rev()
            .find(|span| time >= span.start)
            .map(|span| span.index)
    }

    pub fn active_at(&self, time: Seconds) -> Option<&SegmentSpan> {
        self.active_index_at(time).map(|i| &self.spans[i])
    }

    /// Time relative to the start of the active segment.
    pub fn local_time(&self, time: Seconds) -> Option<(usize, Seconds)> {
        let span = self.active_at(time)?;
        Some((span.index, (time - span.start).min(span.duration)))
    }
}

fn sanitize(duration: Seconds) -> Seconds {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SegmentRef;

    fn segs(durations: &[f64]) -> Vec<SegmentRef> {
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| SegmentRef::new(format!("scene_{i}"), *d))
            .collect()
    }

    #[test]
    fn start_offsets_are_prefix_sums() {
        let layout = SceneLayout::compute(&segs(&[5.0, 2.5, 10.0, 0.5]));
        let starts: Vec<f64> = layout.spans().iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0.0, 5.0, 7.5, 17.5]);
        assert_eq!(layout.total_duration(), 18.0);
    }

    #[test]
    fn prefix_sums_hold_for_many_durations() {
        let durations: Vec<f64> = (1..=40).map(|i| (i % 7) as f64 + 0.25).collect();
        let layout = SceneLayout::compute(&segs(&durations));
        let mut expected = 0.0;
        for (span, d) in layout.spans().iter().zip(&durations) {
            assert_eq!(span.start, expected);
            expected += d;
        }
        assert_eq!(layout.total_duration(), expected);
    }

    #[test]
    fn empty_layout_has_no_active_scene() {
        let layout = SceneLayout::compute::<SegmentRef>(&[]);
        assert_eq!(layout.total_duration(), 0.0);
        assert_eq!(layout.active_index_at(0.0), None);
    }

    #[test]
    fn active_scene_is_last_started() {
        let layout = SceneLayout::compute(&segs(&[5.0, 3.0, 2.0]));
        assert_eq!(layout.active_index_at(0.0), Some(0));
        assert_eq!(layout.active_index_at(4.99), Some(0));
        assert_eq!(layout.active_index_at(5.0), Some(1));
        assert_eq!(layout.active_index_at(9.0), Some(2));
        // Past the end the last scene stays active.
        assert_eq!(layout.active_index_at(42.0), Some(2));
        assert_eq!(layout.active_index_at(-1.0), None);
    }

    #[test]
    fn local_time_is_relative_to_scene_start() {
        let layout = SceneLayout::compute(&segs(&[5.0, 3.0]));
        assert_eq!(layout.local_time(6.5), Some((1, 1.5)));
    }

    #[test]
    fn strict_rejects_zero_duration() {
        let err = SceneLayout::compute_strict(&segs(&[5.0, 0.0])).unwrap_err();
        assert_eq!(
            err,
            TimelineError::InvalidDuration {
                id: "scene_1".to_string(),
                duration: 0.0
            }
        );
    }

    #[test]
    fn lookup_by_id() {
        let layout = SceneLayout::compute(&segs(&[1.0, 2.0]));
        assert_eq!(layout.start_of("scene_1"), Some(1.0));
        assert!(layout.span("missing").is_err());
    }
}
