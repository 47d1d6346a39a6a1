//! Cooperative shutdown token shared by every driver task.
//!
//! Both the configuration watch and OS signals trip the same token; tasks
//! race their suspension points against it in `tokio::select!`.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

/// Triggering half of the shutdown token. Cheap to clone.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

/// Receiving half, cloned into every task.
pub type ShutdownSignal = watch::Receiver<bool>;

/// Create a linked (trigger, signal) pair. The token starts untripped.
pub fn channel() -> (Shutdown, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (Shutdown { tx: Arc::new(tx) }, rx)
}

impl Shutdown {
    /// Trip the token. Idempotent.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether the token has been tripped.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Resolve once the token trips. Resolves immediately if already tripped.
pub async fn triggered(signal: &mut ShutdownSignal) {
    // A dropped sender counts as shutdown too.
    let _ = signal.wait_for(|stop| *stop).await;
}

/// Trip the token on SIGINT or SIGTERM.
pub fn listen_for_signals(shutdown: Shutdown) {
    tokio::spawn(async move {
        os_signal().await;
        info!("shutdown signal received");
        shutdown.trigger();
    });
}

/// Wait for SIGINT or SIGTERM (Unix) or Ctrl+C (cross-platform fallback).
async fn os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT");
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM");
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl_c");
    }
}
