/// Motion event queue
///
/// Unbounded FIFO between the debouncer (producer) and the orchestrator
/// (consumer). Putting never blocks or drops; taking blocks until an event
/// arrives or shutdown is triggered.
use crossbeam_channel::{select, unbounded, Receiver, Sender};

use super::events::MotionEvent;
use super::shutdown::ShutdownSignal;

/// Hand-off point between motion polling and effect handling
#[derive(Clone)]
pub struct EventQueue {
    sender: Sender<MotionEvent>,
    receiver: Receiver<MotionEvent>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Enqueue an event (never blocks)
    pub fn put(&self, event: MotionEvent) {
        // The queue holds its own receiver, so the channel cannot disconnect
        let _ = self.sender.send(event);
    }

    /// Take the oldest event, or `None` once shutdown is triggered
    pub fn take(&self, shutdown: &ShutdownSignal) -> Option<MotionEvent> {
        if shutdown.is_triggered() {
            return None;
        }

        select! {
            recv(self.receiver) -> event => event.ok(),
            recv(shutdown.receiver()) -> _ => None,
        }
    }

    /// Number of events waiting to be handled
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::shutdown;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_queue_is_fifo() {
        let (_trigger, signal) = shutdown::channel();
        let queue = EventQueue::new();

        for tick in [5, 3, 9] {
            queue.put(MotionEvent::new(tick as u64, tick));
        }
        assert_eq!(queue.len(), 3);

        let ticks: Vec<i64> = (0..3)
            .filter_map(|_| queue.take(&signal))
            .map(|e| e.tick)
            .collect();
        assert_eq!(ticks, vec![5, 3, 9]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_take_waits_for_producer() {
        let (_trigger, signal) = shutdown::channel();
        let queue = EventQueue::new();
        let producer = queue.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.put(MotionEvent::new(1, 42));
        });

        let event = queue.take(&signal).expect("event");
        assert_eq!(event.tick, 42);
        handle.join().unwrap();
    }

    #[test]
    fn test_take_is_cancellable() {
        let (trigger, signal) = shutdown::channel();
        let queue = EventQueue::new();
        let consumer = queue.clone();

        let handle = thread::spawn(move || consumer.take(&signal));
        thread::sleep(Duration::from_millis(20));
        trigger.trigger();

        assert!(handle.join().unwrap().is_none());
    }
}
