//! Graceful shutdown signal handling.
//!
//! Stops the accept loop on SIGTERM/SIGINT (or a programmatic trigger) and
//! lets in-flight connections finish within the configured timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use vestibule_server::ShutdownSignal;
//!
//! let shutdown = ShutdownSignal::new();
//! let handle = tokio::spawn(server.run_with_shutdown(shutdown.clone()));
//!
//! shutdown.trigger();
//! handle.await??;
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};

/// A cloneable shutdown flag every task can await.
///
/// # Example
///
/// ```rust
/// use vestibule_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let clone = shutdown.clone();
///
/// shutdown.trigger();
/// assert!(clone.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Triggers shutdown. Idempotent.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    /// Returns `true` once shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Completes when shutdown is triggered, immediately if it already was.
    pub async fn recv(&self) {
        let mut receiver = self.sender.subscribe();
        // the sender lives as long as `self`, so this cannot fail
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }

    /// Creates a signal triggered by SIGTERM or SIGINT (Ctrl+C elsewhere).
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            wait_for_os_signal().await;
            trigger.trigger();
        });

        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for an OS shutdown signal. Never completes if the handlers cannot
/// be installed.
async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let handlers = signal(SignalKind::terminate()).and_then(|t| Ok((t, signal(SignalKind::interrupt())?)));
        let (mut sigterm, mut sigint) = match handlers {
            Ok(handlers) => handlers,
            Err(e) => {
                tracing::error!(error = %e, "failed to register signal handlers");
                std::future::pending::<()>().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to wait for Ctrl+C");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, initiating graceful shutdown");
    }
}

/// Counts open connections so shutdown can wait for them.
///
/// # Example
///
/// ```rust
/// use vestibule_server::shutdown::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
/// let token = tracker.acquire();
/// assert_eq!(tracker.active_connections(), 1);
///
/// drop(token);
/// assert_eq!(tracker.active_connections(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl ConnectionTracker {
    /// Creates a tracker with no connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection until the token is dropped.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            active: Arc::clone(&self.active),
            notify: Arc::clone(&self.notify),
        }
    }

    /// Number of open connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Completes when no connection is open.
    pub async fn wait_for_shutdown(&self) {
        loop {
            // registered before the check so a concurrent drop is not missed
            let notified = self.notify.notified();
            if self.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// An open connection. Dropping it decrements the tracker.
#[derive(Debug)]
pub struct ConnectionToken {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }
}
