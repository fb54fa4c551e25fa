//! "New status available" signalling.
//!
//! The client holds the only [`Notifier`]; a frontend holds the matching
//! [`NotifyReceiver`] and registers it with its own event loop. A signal
//! means "re-read the status snapshot", not "this is what changed": the
//! consumer drains everything pending and then looks at the whole status.

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::trace;

/// One signal. Carries the raw status line that caused it, for transcripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    line: Bytes,
}

impl Notification {
    /// The raw line, without its newline.
    #[must_use]
    pub fn line(&self) -> &str {
        std::str::from_utf8(&self.line).unwrap_or_default()
    }
}

/// Create a connected notifier/receiver pair.
#[must_use]
pub fn channel() -> (Notifier, NotifyReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier { tx }, NotifyReceiver { rx })
}

/// Writing end. Never blocks.
#[derive(Debug)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Signal that `line` has been applied to the status.
    pub fn notify(&self, line: &str) {
        let note = Notification { line: Bytes::copy_from_slice(line.as_bytes()) };
        if self.tx.send(note).is_err() {
            trace!("Notification receiver dropped");
        }
    }
}

/// Reading end, to be polled by the frontend's event loop.
#[derive(Debug)]
pub struct NotifyReceiver {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl NotifyReceiver {
    /// Wait until at least one signal is pending, then take all of them.
    ///
    /// Returns `None` once the client has been dropped. Cancel safe.
    pub async fn changed(&mut self) -> Option<Vec<Notification>> {
        let first = self.rx.recv().await?;
        let mut batch = vec![first];
        batch.extend(self.drain());
        Some(batch)
    }

    /// Take every pending signal without waiting.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::iter::from_fn(|| self.rx.try_recv().ok()).collect()
    }
}
