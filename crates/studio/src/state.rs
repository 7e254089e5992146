//! Request state shared by every panel.
//!
//! A panel is `Idle` until a request starts, `Requesting` while it runs and
//! either back to `Idle` or `Failed(message)` afterwards. Starting a second
//! request while one is running is refused with [`PanelError::Busy`].

use crate::PanelError;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelStatus {
    Idle,
    Requesting,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct PanelState {
    status: Arc<Mutex<PanelStatus>>,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            status: Arc::new(Mutex::new(PanelStatus::Idle)),
        }
    }
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> PanelStatus {
        self.status.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        matches!(*self.status.lock(), PanelStatus::Requesting)
    }

    /// Last failure message, cleared by the next `begin`.
    pub fn error(&self) -> Option<String> {
        match &*self.status.lock() {
            PanelStatus::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    pub fn begin(&self) -> Result<PanelGuard, PanelError> {
        let mut status = self.status.lock();
        if *status == PanelStatus::Requesting {
            return Err(PanelError::Busy);
        }
        *status = PanelStatus::Requesting;
        Ok(PanelGuard {
            state: self.clone(),
            finished: false,
        })
    }

    /// Runs `work` inside a request, recording its failure message.
    pub async fn run<T, F>(&self, work: F) -> Result<T, PanelError>
    where
        F: Future<Output = Result<T, PanelError>>,
    {
        let guard = self.begin()?;
        match work.await {
            Ok(value) => {
                guard.succeed();
                Ok(value)
            }
            Err(err) => {
                guard.fail(err.to_string());
                Err(err)
            }
        }
    }

    fn set(&self, status: PanelStatus) {
        *self.status.lock() = status;
    }
}

/// Open request. Dropping it without an outcome (a cancelled future)
/// returns the panel to `Idle`.
#[must_use]
pub struct PanelGuard {
    state: PanelState,
    finished: bool,
}

impl PanelGuard {
    pub fn succeed(mut self) {
        self.finished = true;
        self.state.set(PanelStatus::Idle);
    }

    pub fn fail(mut self, message: impl Into<String>) {
        self.finished = true;
        self.state.set(PanelStatus::Failed(message.into()));
    }
}

impl Drop for PanelGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.state.set(PanelStatus::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected_while_requesting() {
        let state = PanelState::new();
        let guard = state.begin().unwrap();
        assert_eq!(state.status(), PanelStatus::Requesting);
        assert!(matches!(state.begin(), Err(PanelError::Busy)));
        guard.succeed();
        assert_eq!(state.status(), PanelStatus::Idle);
    }

    #[test]
    fn failure_is_kept_until_next_request() {
        let state = PanelState::new();
        state.begin().unwrap().fail("quota exceeded");
        assert_eq!(state.error().as_deref(), Some("quota exceeded"));

        let guard = state.begin().unwrap();
        assert_eq!(state.error(), None);
        drop(guard);
        assert_eq!(state.status(), PanelStatus::Idle);
    }

    #[tokio::test]
    async fn run_records_the_error_message() {
        let state = PanelState::new();
        let result: Result<(), _> = state
            .run(async { Err(PanelError::precondition("Scene script is empty.")) })
            .await;
        assert!(result.is_err());
        assert_eq!(
            state.status(),
            PanelStatus::Failed("Scene script is empty.".into())
        );

        let value = state.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(state.status(), PanelStatus::Idle);
    }
}
