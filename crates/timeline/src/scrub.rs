use crate::Seconds;
use serde::{Deserialize, Serialize};

pub const PIXELS_PER_SECOND: f64 = 60.0;

/// Maps pointer positions on the scene strip to times and back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scrubber {
    pub pixels_per_second: f64,
    pub total_duration: Seconds,
}

impl Scrubber {
    pub fn new(total_duration: Seconds) -> Self {
        Self {
            pixels_per_second: PIXELS_PER_SECOND,
            total_duration: total_duration.max(0.0),
        }
    }

    pub fn with_scale(mut self, pixels_per_second: f64) -> Self {
        self.pixels_per_second = pixels_per_second;
        self
    }

    /// `x` is measured from the left edge of the strip, in pixels.
    pub fn time_at(&self, x: f64) -> Seconds {
        if !x.is_finite() || self.pixels_per_second <= 0.0 {
            return if x == f64::INFINITY {
                self.total_duration
            } else {
                0.0
            };
        }
        (x / self.pixels_per_second).clamp(0.0, self.total_duration)
    }

    pub fn position_of(&self, time: Seconds) -> f64 {
        time * self.pixels_per_second
    }

    /// Strip width including the trailing five seconds of headroom.
    pub fn strip_width(&self) -> f64 {
        (self.total_duration + 5.0) * self.pixels_per_second
    }
}

/// Scroll offset that keeps the playhead inside the 20%..80% band of the viewport.
pub fn follow_scroll(playhead_x: f64, scroll_left: f64, viewport_width: f64) -> f64 {
    let on_screen = playhead_x - scroll_left;
    let high = viewport_width * 0.8;
    let low = viewport_width * 0.2;
    if on_screen > high {
        scroll_left + (on_screen - high)
    } else if on_screen < low && scroll_left > 0.0 {
        (scroll_left - (low - on_screen)).max(0.0)
    } else {
        scroll_left
    }
}
