use crate::{GenerationError, GenerativeBackend, VideoOperation};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoJobState {
    /// Still rendering; `polls` counts status checks so far.
    Pending { polls: u32 },
    Done(String),
    Failed(String),
    Cancelled,
}

impl VideoJobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VideoJobState::Pending { .. })
    }
}

/// Background task polling a long-running video operation at a fixed
/// interval until it finishes, fails or is cancelled.
pub struct VideoJob {
    state: watch::Receiver<VideoJobState>,
    cancel: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl VideoJob {
    pub fn spawn(backend: Arc<dyn GenerativeBackend>, operation: VideoOperation, interval: Duration) -> Self {
        let (state_tx, state_rx) = watch::channel(VideoJobState::Pending { polls: 0 });
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(poll_loop(backend, operation, interval, state_tx, cancel_rx));
        Self {
            state: state_rx,
            cancel: cancel_tx,
            handle: Some(handle),
        }
    }

    pub fn state(&self) -> VideoJobState {
        self.state.borrow().clone()
    }

    /// Watch handle for progress reporting.
    pub fn subscribe(&self) -> watch::Receiver<VideoJobState> {
        self.state.clone()
    }

    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Waits for a terminal state and returns the video URI.
    pub async fn wait(mut self) -> Result<String, GenerationError> {
        let terminal = loop {
            let current = self.state.borrow_and_update().clone();
            if current.is_terminal() {
                break current;
            }
            if self.state.changed().await.is_err() {
                // Task ended without publishing a terminal state.
                break self.state.borrow().clone();
            }
        };
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        match terminal {
            VideoJobState::Done(uri) => Ok(uri),
            VideoJobState::Failed(message) => Err(GenerationError::JobFailed(message)),
            VideoJobState::Cancelled => Err(GenerationError::Cancelled),
            VideoJobState::Pending { .. } => Err(GenerationError::JobFailed(
                "polling stopped before the video finished".to_string(),
            )),
        }
    }
}

impl Drop for VideoJob {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn poll_loop(
    backend: Arc<dyn GenerativeBackend>,
    mut operation: VideoOperation,
    interval: Duration,
    state: watch::Sender<VideoJobState>,
    mut cancel: watch::Receiver<bool>,
) {
    let mut polls = 0u32;
    loop {
        if let Some(terminal) = terminal_state(&operation) {
            info!(operation = %operation.name, polls, "video job finished");
            let _ = state.send(terminal);
            return;
        }
        tokio::select! {
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    debug!(operation = %operation.name, "video job cancelled");
                    let _ = state.send(VideoJobState::Cancelled);
                    return;
                }
                continue;
            }
            _ = tokio::time::sleep(interval) => {}
        }
        polls += 1;
        match backend.poll_video(&operation).await {
            Ok(next) => {
                operation = next;
                let _ = state.send(VideoJobState::Pending { polls });
            }
            Err(err) => {
                warn!(operation = %operation.name, error = %err, "video poll failed");
                let _ = state.send(VideoJobState::Failed(err.to_string()));
                return;
            }
        }
    }
}

fn terminal_state(operation: &VideoOperation) -> Option<VideoJobState> {
    if let Some(error) = &operation.error {
        return Some(VideoJobState::Failed(error.clone()));
    }
    if !operation.done {
        return None;
    }
    Some(match &operation.video_uri {
        Some(uri) => VideoJobState::Done(uri.clone()),
        None => VideoJobState::Failed("Generation failed.".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedBackend;

    fn pending(name: &str) -> VideoOperation {
        VideoOperation {
            name: name.into(),
            ..VideoOperation::default()
        }
    }

    #[tokio::test]
    async fn polls_until_done() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_poll(Ok(pending("op")));
        backend.push_poll(Ok(VideoOperation {
            name: "op".into(),
            done: true,
            video_uri: Some("https://files/v.mp4".into()),
            error: None,
        }));
        let job = VideoJob::spawn(backend.clone(), pending("op"), Duration::from_millis(5));
        assert_eq!(job.wait().await.unwrap(), "https://files/v.mp4");
        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn done_without_uri_fails() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_poll(Ok(VideoOperation {
            name: "op".into(),
            done: true,
            ..VideoOperation::default()
        }));
        let job = VideoJob::spawn(backend, pending("op"), Duration::from_millis(1));
        assert!(matches!(job.wait().await, Err(GenerationError::JobFailed(_))));
    }

    #[tokio::test]
    async fn poll_error_fails_job() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_poll(Err(GenerationError::RateLimited("slow down".into())));
        let job = VideoJob::spawn(backend, pending("op"), Duration::from_millis(1));
        assert_eq!(
            job.wait().await,
            Err(GenerationError::JobFailed("slow down".into()))
        );
    }

    #[tokio::test]
    async fn cancel_stops_promptly() {
        let backend = Arc::new(ScriptedBackend::new());
        let job = VideoJob::spawn(backend.clone(), pending("op"), Duration::from_secs(3600));
        job.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), job.wait())
            .await
            .expect("cancel should not wait for the poll interval");
        assert_eq!(result, Err(GenerationError::Cancelled));
        assert!(backend.requests().is_empty());
    }
}
