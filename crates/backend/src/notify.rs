//! Startup Notification Channel
//!
//! Typed channel carrying supervisor progress to the presentation layer.
//! Exactly two variants exist: a human-readable status line for the loading
//! screen, and the terminal readiness signal. Sends are fire-and-forget —
//! the supervisor never blocks on, and never fails because of, a slow or
//! departed receiver.

use tokio::sync::mpsc;

/// One notification from the supervisor to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupNotice {
    /// Display this status text on the loading screen.
    ///
    /// May fire any number of times; receivers must tolerate duplicates and
    /// always display the latest text, including after a `Ready` was seen.
    StatusUpdate(String),
    /// The backend answered its readiness probe; hide the loading screen.
    ///
    /// Fired once per successful startup; receivers must treat a repeated
    /// delivery as a no-op.
    Ready,
}

/// Sending half of the startup notification channel.
#[derive(Debug, Clone)]
pub struct StartupNotifier {
    tx: mpsc::UnboundedSender<StartupNotice>,
}

impl StartupNotifier {
    /// Create a notifier together with its receiving half.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StartupNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Send a status update for the loading screen.
    pub fn status(&self, message: impl Into<String>) {
        self.send(StartupNotice::StatusUpdate(message.into()));
    }

    /// Signal that the backend is ready.
    pub fn ready(&self) {
        self.send(StartupNotice::Ready);
    }

    fn send(&self, notice: StartupNotice) {
        if self.tx.send(notice).is_err() {
            // Receiver is gone (e.g. headless run); startup proceeds anyway
            tracing::debug!("startup notice dropped: receiver closed");
        }
    }
}
