//! Provisioning events.
//!
//! Every state transition of a provisioning request is broadcast as a
//! [`ProvisionEvent`] so subscribers and the monitor can follow it.

mod state;

pub use state::ProvisionState;

use crate::{allocator::FlowId, utils};

/// Generic event wrapper.
#[derive(Debug, Clone)]
pub struct Event<T> {
    inner: T,
}

/// One state transition of one provisioning request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionEvent {
    pub flow_id: FlowId,
    pub state: ProvisionState,
    /// Human-readable detail; the failure reason for `Failed`.
    pub message: String,
    pub timestamp: i64,
}

impl ProvisionEvent {
    pub fn new(
        flow_id: &str,
        state: ProvisionState,
        message: impl Into<String>,
    ) -> Self {
        Self {
            flow_id: flow_id.to_string(),
            state,
            message: message.into(),
            timestamp: utils::time::time_millis(),
        }
    }
}

impl<T> std::ops::Deref for Event<T>
where
    T: std::fmt::Debug + Clone,
{
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> Event<T>
where
    T: std::fmt::Debug + Clone,
{
    pub fn new(inner: &T) -> Self {
        Self {
            inner: inner.clone(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}
