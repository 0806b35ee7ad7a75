//! Message queues between components.
//!
//! `Queue` is point-to-point, `BroadcastQueue` fans out to every subscriber.

use std::{sync::Arc, time::Duration};

use tokio::sync::broadcast;

use crate::{FlowpathError, Result};

/// Bounded MPMC queue backed by flume. Each message is consumed once.
#[derive(Clone)]
pub struct Queue<T> {
    receiver: Arc<flume::Receiver<T>>,
    sender: Arc<flume::Sender<T>>,
}

impl<T> Queue<T> {
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, rx) = flume::bounded(cap);

        Arc::new(Self {
            receiver: Arc::new(rx),
            sender: Arc::new(tx),
        })
    }

    /// Returns immediately when the queue is empty.
    pub fn try_next(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Waits at most `timeout` for capacity.
    pub fn send_timeout(
        &self,
        msg: T,
        timeout: Duration,
    ) -> Result<()> {
        self.sender.send_timeout(msg, timeout).map_err(|e| FlowpathError::Queue(e.to_string()))
    }

    pub async fn next_async(&self) -> Option<T> {
        self.receiver.recv_async().await.ok()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// One-to-many queue backed by tokio's broadcast channel.
#[derive(Clone)]
pub struct BroadcastQueue<T> {
    sender: Arc<broadcast::Sender<T>>,
}

impl<T: Clone> BroadcastQueue<T> {
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, _) = broadcast::channel(cap);

        Arc::new(Self {
            sender: Arc::new(tx),
        })
    }

    /// Fails when nobody is subscribed.
    pub fn send(
        &self,
        msg: T,
    ) -> Result<()> {
        self.sender.send(msg).map_err(|e| FlowpathError::Queue(e.to_string()))?;
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_send_timeout_when_full() {
        let queue = Queue::new(1);
        queue.send_timeout(1, Duration::from_millis(10)).unwrap();
        let err = queue.send_timeout(2, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, FlowpathError::Queue(_)));
        assert_eq!(queue.try_next(), Some(1));
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let queue = BroadcastQueue::new(4);
        assert!(queue.send(1).is_err());

        let mut rx = queue.subscribe();
        queue.send(2).unwrap();
        assert_eq!(rx.try_recv().unwrap(), 2);
    }
}
