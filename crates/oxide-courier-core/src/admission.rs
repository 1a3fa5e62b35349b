//! Call-order admission for queued sends.
//!
//! A send addressed to `@name` must be resolved before it can be queued, and
//! resolutions finish in any order. Each queued send therefore takes a
//! [`Ticket`] at call time and hands its entry to the send queue only after
//! every earlier ticket has done so. Resolutions still run concurrently.

use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot::{self, error::TryRecvError};

/// Issues tickets in call order.
#[derive(Debug, Default)]
pub struct AdmissionGate {
    tail: Mutex<Option<oneshot::Receiver<()>>>,
}

/// A position in the admission order.
///
/// Dropping the ticket lets the next one through, but never before every
/// earlier ticket has been released.
#[derive(Debug)]
pub struct Ticket {
    previous: Option<oneshot::Receiver<()>>,
    done: Option<oneshot::Sender<()>>,
}

impl AdmissionGate {
    /// Create a gate with no outstanding tickets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next ticket.
    pub fn admit(&self) -> Ticket {
        let (done, next) = oneshot::channel();
        let previous = self
            .tail
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(next);
        Ticket {
            previous,
            done: Some(done),
        }
    }
}

impl Ticket {
    /// True when every earlier ticket has been released.
    pub fn is_ready(&mut self) -> bool {
        let Some(previous) = self.previous.as_mut() else {
            return true;
        };
        match previous.try_recv() {
            Err(TryRecvError::Empty) => false,
            // Senders never send, so a closed channel means released.
            Ok(()) | Err(TryRecvError::Closed) => {
                self.previous = None;
                true
            }
        }
    }

    /// Wait until every earlier ticket has been released.
    pub async fn wait_turn(&mut self) {
        if let Some(previous) = self.previous.as_mut() {
            let _ = previous.await;
            self.previous = None;
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let (Some(previous), Some(done)) = (self.previous.take(), self.done.take()) else {
            return;
        };
        // Dropped out of turn: release the successor once the predecessor is.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = previous.await;
                drop(done);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_ticket_is_ready() {
        let gate = AdmissionGate::new();
        let mut ticket = gate.admit();
        assert!(ticket.is_ready());
    }

    #[test]
    fn test_ticket_waits_for_predecessor_release() {
        let gate = AdmissionGate::new();
        let first = gate.admit();
        let mut second = gate.admit();
        let mut third = gate.admit();

        assert!(!second.is_ready());
        drop(first);
        assert!(second.is_ready());
        assert!(!third.is_ready());
        drop(second);
        assert!(third.is_ready());
    }

    #[tokio::test]
    async fn test_wait_turn_resolves_after_release() {
        let gate = AdmissionGate::new();
        let first = gate.admit();
        let mut second = gate.admit();

        let waiter = tokio::spawn(async move {
            second.wait_turn().await;
            second
        });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(first);
        let mut second = waiter.await.expect("waiter task");
        assert!(second.is_ready());
    }

    #[tokio::test]
    async fn test_early_drop_does_not_skip_predecessor() {
        let gate = AdmissionGate::new();
        let first = gate.admit();
        let second = gate.admit();
        let mut third = gate.admit();

        drop(second);
        tokio::task::yield_now().await;
        assert!(!third.is_ready());

        drop(first);
        third.wait_turn().await;
        assert!(third.is_ready());
    }
}
