/// Cooperative cancellation
///
/// A shutdown token is a crossbeam channel nobody ever sends on. Dropping the
/// trigger's sender disconnects the channel, which wakes every clone of the
/// signal at once, including ones parked in `select!` or `recv_timeout`.
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

/// Result of a cancellable wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// The full duration passed
    Elapsed,
    /// Shutdown was triggered before the duration passed
    Cancelled,
}

impl Wait {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Wait::Cancelled)
    }
}

/// Create a connected trigger/signal pair
pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = bounded(0);
    (
        ShutdownTrigger {
            sender: Mutex::new(Some(tx)),
        },
        ShutdownSignal { receiver: rx },
    )
}

/// Owner side of the token; triggering is idempotent
#[derive(Debug)]
pub struct ShutdownTrigger {
    sender: Mutex<Option<Sender<()>>>,
}

impl ShutdownTrigger {
    /// Broadcast shutdown to every signal
    pub fn trigger(&self) {
        self.sender.lock().take();
    }

    pub fn is_triggered(&self) -> bool {
        self.sender.lock().is_none()
    }
}

/// Observer side of the token
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: Receiver<()>,
}

impl ShutdownSignal {
    /// Check whether shutdown has been triggered
    pub fn is_triggered(&self) -> bool {
        matches!(
            self.receiver.try_recv(),
            Err(crossbeam_channel::TryRecvError::Disconnected)
        )
    }

    /// Sleep for `duration` unless shutdown is triggered first
    pub fn sleep(&self, duration: Duration) -> Wait {
        match self.receiver.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => Wait::Elapsed,
            Err(RecvTimeoutError::Disconnected) | Ok(()) => Wait::Cancelled,
        }
    }

    /// Block until shutdown is triggered
    pub fn wait(&self) {
        let _ = self.receiver.recv();
    }

    /// Receiver for use in `crossbeam_channel::select!`
    pub fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}
