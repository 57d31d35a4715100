//! Contains the types used to shut a running [`Server`](crate::Server) down gracefully.

use std::time::Duration;
use tokio::sync::{Mutex, RwLock, broadcast, mpsc};

/// The default time sessions get to wind down after a shutdown was requested.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Returned by the future given to
/// [`ServerBuilder::shutdown_indicator`](crate::ServerBuilder::shutdown_indicator) to tell the
/// server how to shut down.
///
/// # Example
///
/// ```rust
/// use activeftp::Shutdown;
/// use std::time::Duration;
///
/// let shutdown = Shutdown::new().grace_period(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shutdown {
    pub(crate) grace_period: Duration,
}

impl Shutdown {
    /// Shut down with the default grace period.
    pub fn new() -> Self {
        Shutdown {
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// How long to wait for sessions to end before [`Server::listen`](crate::Server::listen)
    /// returns anyway.
    pub fn grace_period(mut self, d: impl Into<Duration>) -> Self {
        self.grace_period = d.into();
        self
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Shutdown::new()
    }
}

// Notifier lets other tasks know that we're shutting down.
#[derive(Debug)]
pub(crate) struct Notifier {
    shutdown_tx: RwLock<Option<broadcast::Sender<()>>>,
    shutdown_complete_tx: RwLock<Option<mpsc::Sender<()>>>,
    shutdown_complete_rx: Mutex<mpsc::Receiver<()>>,
}

impl Notifier {
    // Creates a new Shutdown notifier
    pub fn new() -> Notifier {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (shutdown_complete_tx, shutdown_complete_rx) = mpsc::channel(1);
        Notifier {
            shutdown_tx: RwLock::new(Some(shutdown_tx)),
            shutdown_complete_tx: RwLock::new(Some(shutdown_complete_tx)),
            shutdown_complete_rx: Mutex::new(shutdown_complete_rx),
        }
    }

    // Notifies shutdown listeners that shutdown is commencing. Listeners then need to gracefully
    // shutdown and signal that they are done by simply letting the Listener instance that they hold
    // go out of scope.
    pub async fn notify(&self) {
        // When the sender is dropped, all tasks which have `subscribe`d will
        // receive the shutdown signal and can exit
        drop(self.shutdown_tx.write().await.take());
        // Drop final `Sender` so the `Receiver` used in linger() will complete
        drop(self.shutdown_complete_tx.write().await.take())
    }

    // Waits for tasks holding shutdown listeners to finish
    pub async fn linger(&self) {
        // Wait for all active connections to finish processing. As the `Sender`
        // handle held by the notifier has been dropped above, the only remaining
        // `Sender` instances are held by connection handler tasks. When those drop,
        // the `mpsc` channel will close and `recv()` will return `None`.
        let _ = self.shutdown_complete_rx.lock().await.recv().await;
    }

    pub async fn subscribe(&self) -> Listener {
        let sender_opt = self.shutdown_tx.read().await;
        let complete_sender_opt = self.shutdown_complete_tx.read().await;
        Listener {
            shutdown: sender_opt.is_none(),
            shutdown_rx: sender_opt.as_ref().map(|tx| tx.subscribe()),
            _shutdown_complete_tx: complete_sender_opt.clone(),
        }
    }
}

// Listener listens for shutdown notifications
#[derive(Debug)]
pub(crate) struct Listener {
    shutdown: bool,
    shutdown_rx: Option<broadcast::Receiver<()>>,
    // Only held so that `Notifier::linger` knows when the last listener is gone.
    _shutdown_complete_tx: Option<mpsc::Sender<()>>,
}

impl Listener {
    /// Receive the shutdown notice, waiting if necessary.
    pub async fn listen(&mut self) {
        // If the shutdown signal has already been received, then return
        // immediately.
        if self.shutdown {
            return;
        }

        // Cannot receive a "lag error" as only one value is ever sent. A closed channel is the
        // signal.
        if let Some(rx) = self.shutdown_rx.as_mut() {
            let _ = rx.recv().await;
        }

        // Remember that the signal has been received.
        self.shutdown = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn grace_period_defaults() {
        assert_eq!(Shutdown::new().grace_period, DEFAULT_GRACE_PERIOD);
        assert_eq!(Shutdown::new().grace_period(Duration::from_secs(1)).grace_period, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn listeners_hear_notify_and_linger_waits_for_them() {
        let notifier = Notifier::new();
        let mut listener = notifier.subscribe().await;

        let session = tokio::spawn(async move {
            listener.listen().await;
            // The listener is dropped as the task ends.
        });

        notifier.notify().await;
        tokio::time::timeout(Duration::from_secs(5), notifier.linger()).await.unwrap();
        session.await.unwrap();
    }

    #[tokio::test]
    async fn subscribing_after_notify_is_already_shut_down() {
        let notifier = Notifier::new();
        notifier.notify().await;

        let mut listener = notifier.subscribe().await;
        tokio::time::timeout(Duration::from_secs(1), listener.listen()).await.unwrap();
    }
}
