use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Holds back a value until no newer one has arrived for a quiet window
///
/// Each [`push`](Self::push) replaces the pending value and restarts the
/// window. [`fired`](Self::fired) completes once the window elapses; it is
/// safe to drop mid-wait inside `select!`, the pending value stays put.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.window));
    }

    /// Waits out the window and yields the surviving value. Never completes
    /// while nothing is pending.
    pub async fn fired(&mut self) -> T {
        let deadline = match &self.pending {
            Some((_, deadline)) => *deadline,
            None => std::future::pending().await,
        };
        sleep_until(deadline).await;

        match self.pending.take() {
            Some((value, _)) => value,
            None => std::future::pending().await,
        }
    }
}
