//! Cooperative cancellation for store calls.
//!
//! A [`Canceller`] owns the sending half of a `tokio::sync::watch` channel;
//! every [`CancellationSignal`] cloned from it observes the same flag. The
//! executor never inspects the signal itself. It hands the signal to every
//! store call and to the caller's update function, and those are expected to
//! stop and fail once it fires.

use tokio::sync::watch;

/// Owner side of a cancellation signal.
#[derive(Debug)]
pub struct Canceller {
    sender: watch::Sender<bool>,
}

impl Canceller {
    /// Create a canceller together with its first signal.
    pub fn pair() -> (Self, CancellationSignal) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, CancellationSignal { receiver })
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Create another signal observing this canceller.
    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Observer side of a cancellation signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    receiver: watch::Receiver<bool>,
}

impl CancellationSignal {
    /// A signal that never fires.
    pub fn none() -> Self {
        let (_, receiver) = watch::channel(false);
        Self { receiver }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once cancellation is requested.
    ///
    /// Pends forever if the canceller is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        let observed = receiver.wait_for(|cancelled| *cancelled).await.map(|_| ());
        if observed.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::none()
    }
}
