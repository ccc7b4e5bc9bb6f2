//! Bounded in-memory MPMC ingress queue.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};

use rtriage_event::Document;

/// A clonable handle over the bounded event channel feeding the router.
///
/// Enqueueing never blocks (a full queue is an error surfaced to the
/// caller); dequeueing blocks with a timeout so workers can re-check the
/// running flag.
#[derive(Debug, Clone)]
pub struct EventQueue {
    tx: Sender<Document>,
    rx: Receiver<Document>,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` in-flight events.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        EventQueue { tx, rx }
    }

    /// Number of events currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub(crate) fn try_enqueue(&self, event: Document) -> Result<(), TrySendError<Document>> {
        self.tx.try_send(event)
    }

    pub(crate) fn dequeue_timeout(&self, timeout: Duration) -> Result<Document, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_capacity() {
        let queue = EventQueue::bounded(2);
        assert!(queue.try_enqueue(Document::new()).is_ok());
        assert!(queue.try_enqueue(Document::new()).is_ok());
        assert!(matches!(
            queue.try_enqueue(Document::new()),
            Err(TrySendError::Full(_))
        ));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_dequeue_timeout_on_empty() {
        let queue = EventQueue::bounded(1);
        assert!(matches!(
            queue.dequeue_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Timeout)
        ));
    }

    #[test]
    fn test_clones_share_the_channel() {
        let queue = EventQueue::bounded(4);
        let other = queue.clone();
        queue.try_enqueue(Document::new()).unwrap();
        assert!(other.dequeue_timeout(Duration::from_millis(10)).is_ok());
    }
}
