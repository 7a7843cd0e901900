//! Shutdown signalling for the greeting server.

use tokio::sync::watch;

/// Latched shutdown flag.
///
/// Once triggered it stays set, so listeners created afterwards see it
/// immediately.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// New listener for a long-running task.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to a task.
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolve once shutdown is triggered or the coordinator is dropped.
    pub async fn wait(mut self) {
        // Err means the sender is gone, which also ends the task.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
