//! Preview playback driver: advances a [`Playback`] once per frame on a
//! tokio task and publishes the cursor through a watch channel.

use std::time::Duration;
use timeline::{Playback, Seconds};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct PreviewHandle {
    time: watch::Receiver<Seconds>,
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<Playback>>,
}

impl PreviewHandle {
    /// Starts playing `playback` (rewinding if it sits at the end).
    pub fn start(playback: Playback) -> Self {
        Self::with_interval(playback, FRAME_INTERVAL)
    }

    pub fn with_interval(mut playback: Playback, interval: Duration) -> Self {
        playback.play();
        let (time_tx, time_rx) = watch::channel(playback.current_time());
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run(playback, interval, time_tx, stop_rx));
        Self {
            time: time_rx,
            stop: stop_tx,
            task: Some(task),
        }
    }

    pub fn current_time(&self) -> Seconds {
        *self.time.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Seconds> {
        self.time.clone()
    }

    /// Pauses and hands back the transport where it stopped.
    pub async fn stop(mut self) -> Playback {
        let _ = self.stop.send(true);
        self.join().await
    }

    /// Waits for playback to reach the end.
    pub async fn finished(mut self) -> Playback {
        self.join().await
    }

    async fn join(&mut self) -> Playback {
        let fallback = Playback::new(self.current_time());
        match self.task.take() {
            Some(task) => task.await.unwrap_or(fallback),
            None => fallback,
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    mut playback: Playback,
    interval: Duration,
    time: watch::Sender<Seconds>,
    mut stop: watch::Receiver<bool>,
) -> Playback {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();
    loop {
        tokio::select! {
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    playback.pause();
                    debug!(time = playback.current_time(), "preview stopped");
                    return playback;
                }
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                let running = playback.tick(now - last);
                last = now;
                let _ = time.send(playback.current_time());
                if !running {
                    debug!(time = playback.current_time(), "preview reached the end");
                    return playback;
                }
            }
        }
    }
}
