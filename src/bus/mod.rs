//! Message bus collaborator.
//!
//! Commands leave the provisioner through [`MessageBus::publish`]; each call
//! either returns an acknowledgment or fails within a bounded wait.

mod mem;

use serde::{Deserialize, Serialize};

use crate::Result;

pub use mem::MemBus;

/// Delivery acknowledgment for a published payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub topic: String,
    pub offset: u64,
}

/// A payload as seen by a bus consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusRecord {
    pub topic: String,
    pub offset: u64,
    pub payload: Vec<u8>,
}

pub trait MessageBus: Send + Sync {
    /// Publishes `payload` on `topic`, blocking until acknowledged.
    ///
    /// Fails with `Publish` when the bus is unreachable or the acknowledgment
    /// does not arrive in time.
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> Result<Ack>;
}
