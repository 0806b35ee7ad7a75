//! Identifier allocation for provisioned flows.
//!
//! Flow ids are random UUID v4 tokens. Transit vlans are drawn at random
//! from a half-open range, and every issued tag is tracked until it is
//! released, so two live flows never share a transit vlan handed out by
//! the same allocator.

use std::{
    collections::HashSet,
    ops::Range,
    sync::{Arc, Mutex},
};

use rand::Rng;
use tracing::trace;

use crate::{FlowpathError, Result};

/// Opaque unique token identifying a logical flow.
pub type FlowId = String;

/// Allocates flow ids and transit vlan tags.
pub struct IdAllocator {
    range: Range<u16>,
    issued: Arc<Mutex<HashSet<u16>>>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(99..4000)
    }
}

impl IdAllocator {
    pub fn new(range: Range<u16>) -> Self {
        Self {
            range,
            issued: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn range(&self) -> Range<u16> {
        self.range.clone()
    }

    /// Returns a fresh flow id.
    pub fn allocate_flow_id(&self) -> FlowId {
        uuid::Uuid::new_v4().to_string()
    }

    /// Draws a transit vlan that is not currently issued.
    ///
    /// The draw is uniform over the range; on collision the nearest free tag
    /// above the draw (wrapping to the start of the range) is taken instead.
    pub fn allocate_transit_vlan(&self) -> Result<u16> {
        let Range {
            start,
            end,
        } = self.range;
        if start >= end {
            return Err(FlowpathError::ExhaustedRange {
                min: start,
                max: end,
            });
        }

        let mut issued = self.issued.lock().map_err(|e| FlowpathError::Store(e.to_string()))?;
        let size = u32::from(end - start);
        let offset = rand::rng().random_range(0..size);

        // (offset + step) % size < size <= u16::MAX - start, so the cast cannot truncate
        let vlan = (0..size).map(|step| start + ((offset + step) % size) as u16).find(|vlan| !issued.contains(vlan)).ok_or(FlowpathError::ExhaustedRange {
            min: start,
            max: end,
        })?;

        issued.insert(vlan);
        trace!("allocator::allocate_transit_vlan({})", vlan);
        Ok(vlan)
    }

    /// Marks a tag already carried by the network as issued.
    ///
    /// Returns `false` when the tag lies outside the range or is already issued.
    pub fn reserve_transit_vlan(
        &self,
        vlan: u16,
    ) -> bool {
        if !self.range.contains(&vlan) {
            return false;
        }
        match self.issued.lock() {
            Ok(mut issued) => issued.insert(vlan),
            Err(_) => false,
        }
    }

    /// Returns a tag to the pool. Returns `false` if the tag was not issued.
    pub fn release_transit_vlan(
        &self,
        vlan: u16,
    ) -> bool {
        match self.issued.lock() {
            Ok(mut issued) => issued.remove(&vlan),
            Err(_) => false,
        }
    }

    /// Number of tags currently issued.
    pub fn issued_count(&self) -> usize {
        self.issued.lock().map(|issued| issued.len()).unwrap_or_default()
    }
}
