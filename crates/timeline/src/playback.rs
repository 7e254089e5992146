use crate::Seconds;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Preview transport: a time cursor advanced by wall-clock deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playback {
    current_time: Seconds,
    total_duration: Seconds,
    state: PlaybackState,
}

impl Playback {
    pub fn new(total_duration: Seconds) -> Self {
        Self {
            current_time: 0.0,
            total_duration: total_duration.max(0.0),
            state: PlaybackState::Stopped,
        }
    }

    pub fn current_time(&self) -> Seconds {
        self.current_time
    }

    pub fn total_duration(&self) -> Seconds {
        self.total_duration
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_at_end(&self) -> bool {
        self.current_time >= self.total_duration
    }

    /// Scenes changed; keep the cursor inside the new range.
    pub fn set_total_duration(&mut self, total: Seconds) {
        self.total_duration = total.max(0.0);
        if self.current_time > self.total_duration {
            self.current_time = self.total_duration;
        }
    }

    /// Starts playback, rewinding first when the cursor sits at the end.
    pub fn play(&mut self) {
        if self.is_at_end() {
            self.current_time = 0.0;
        }
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        self.state = PlaybackState::Stopped;
    }

    pub fn toggle(&mut self) -> PlaybackState {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.state
    }

    pub fn seek(&mut self, time: Seconds) {
        let time = if time.is_finite() { time } else { 0.0 };
        self.current_time = time.clamp(0.0, self.total_duration);
    }

    /// Advances the cursor by one animation tick. Returns whether playback is still running.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.is_playing() {
            return false;
        }
        let next = self.current_time + elapsed.as_secs_f64();
        if next >= self.total_duration {
            self.current_time = self.total_duration;
            self.state = PlaybackState::Stopped;
            return false;
        }
        self.current_time = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_only_while_playing() {
        let mut playback = Playback::new(10.0);
        assert!(!playback.tick(Duration::from_millis(500)));
        assert_eq!(playback.current_time(), 0.0);

        playback.play();
        assert!(playback.tick(Duration::from_millis(500)));
        assert!(playback.tick(Duration::from_millis(250)));
        assert!((playback.current_time() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn reaching_the_end_stops_and_clamps() {
        let mut playback = Playback::new(1.0);
        playback.play();
        assert!(playback.tick(Duration::from_millis(900)));
        assert!(!playback.tick(Duration::from_millis(900)));
        assert_eq!(playback.current_time(), 1.0);
        assert_eq!(playback.state(), PlaybackState::Stopped);
    }

    #[test]
    fn play_at_end_rewinds() {
        let mut playback = Playback::new(2.0);
        playback.seek(5.0);
        assert_eq!(playback.current_time(), 2.0);
        playback.play();
        assert_eq!(playback.current_time(), 0.0);
        assert!(playback.is_playing());
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let mut playback = Playback::new(3.0);
        assert_eq!(playback.toggle(), PlaybackState::Playing);
        playback.tick(Duration::from_secs(1));
        assert_eq!(playback.toggle(), PlaybackState::Stopped);
        assert_eq!(playback.current_time(), 1.0);
        assert_eq!(playback.toggle(), PlaybackState::Playing);
        assert_eq!(playback.current_time(), 1.0);
    }

    #[test]
    fn shrinking_total_clamps_cursor() {
        let mut playback = Playback::new(10.0);
        playback.seek(8.0);
        playback.set_total_duration(4.0);
        assert_eq!(playback.current_time(), 4.0);
    }

    #[test]
    fn empty_timeline_never_plays_past_zero() {
        let mut playback = Playback::new(0.0);
        playback.play();
        assert!(!playback.tick(Duration::from_millis(16)));
        assert_eq!(playback.current_time(), 0.0);
    }
}
