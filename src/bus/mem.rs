use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tracing::trace;

use crate::{
    FlowpathError, Result,
    bus::{Ack, BusRecord, MessageBus},
    common::Queue,
};

/// In-process bus over a bounded queue.
///
/// A publish is acknowledged once the record is queued; a full queue that
/// does not drain within `ack_timeout` fails the publish.
pub struct MemBus {
    queue: Arc<Queue<BusRecord>>,
    offset: AtomicU64,
    ack_timeout: Duration,
}

impl MemBus {
    pub fn new(
        capacity: usize,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            queue: Queue::new(capacity),
            offset: AtomicU64::new(0),
            ack_timeout,
        }
    }

    /// Next queued record, if any.
    pub fn try_recv(&self) -> Option<BusRecord> {
        self.queue.try_next()
    }

    pub async fn recv_async(&self) -> Option<BusRecord> {
        self.queue.next_async().await
    }

    /// Takes every queued record in publish order.
    pub fn drain(&self) -> Vec<BusRecord> {
        std::iter::from_fn(|| self.queue.try_next()).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl MessageBus for MemBus {
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> Result<Ack> {
        let offset = self.offset.fetch_add(1, Ordering::SeqCst);
        let record = BusRecord {
            topic: topic.to_string(),
            offset,
            payload,
        };

        self.queue.send_timeout(record, self.ack_timeout).map_err(|e| FlowpathError::Publish(format!("topic {}: {}", topic, e)))?;
        trace!("bus::publish({}, {})", topic, offset);

        Ok(Ack {
            topic: topic.to_string(),
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = MemBus::new(8, Duration::from_millis(50));
        let first = bus.publish("kilda-test", b"one".to_vec()).unwrap();
        let second = bus.publish("kilda-test", b"two".to_vec()).unwrap();
        assert_eq!(first.offset + 1, second.offset);
        assert_eq!(bus.len(), 2);

        let records = bus.drain();
        assert_eq!(records.iter().map(|r| r.payload.as_slice()).collect::<Vec<_>>(), vec![b"one".as_slice(), b"two".as_slice()]);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_publish_times_out_when_full() {
        let bus = MemBus::new(1, Duration::from_millis(20));
        bus.publish("kilda-test", b"one".to_vec()).unwrap();
        let err = bus.publish("kilda-test", b"two".to_vec()).unwrap_err();
        assert!(matches!(err, FlowpathError::Publish(_)));
    }
}
