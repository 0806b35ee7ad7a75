//! Path discovery over the switch topology.
//!
//! - `Topology`: the store-facing collaborator (path query, link resolution, persistence)
//! - `PathFinder`: shortest path of active links between two switches
//! - `PathExpander`: resolves a path's link references into per-hop attributes

mod expander;
mod finder;
mod graph;

use serde::{Deserialize, Serialize};

use crate::{FlowpathError, Result, store::data};

pub use expander::PathExpander;
pub use finder::PathFinder;
pub use graph::TopologyGraph;

/// Reference to a stored inter-switch link.
pub type IslId = String;

/// Liveness of a switch or link.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LinkState {
    #[default]
    Active,
    Inactive,
}

/// Ordered link references from a source switch to a destination switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub src_switch: String,
    pub dst_switch: String,
    pub isls: Vec<IslId>,
}

impl Path {
    /// Number of links in the path.
    pub fn hops(&self) -> usize {
        self.isls.len()
    }
}

/// Fully resolved attributes of one link in a path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkAttributes {
    pub src_switch: String,
    pub src_port: u32,
    pub dst_switch: String,
    pub dst_port: u32,
}

impl LinkAttributes {
    pub fn new(
        src_switch: impl Into<String>,
        src_port: u32,
        dst_switch: impl Into<String>,
        dst_port: u32,
    ) -> Self {
        Self {
            src_switch: src_switch.into(),
            src_port,
            dst_switch: dst_switch.into(),
            dst_port,
        }
    }
}

impl TryFrom<&data::Isl> for LinkAttributes {
    type Error = FlowpathError;

    fn try_from(isl: &data::Isl) -> Result<Self> {
        let port = |name: &str, value: i64| {
            u32::try_from(value).map_err(|_| FlowpathError::MalformedInput(format!("link {} has invalid {}: {}", isl.id, name, value)))
        };

        Ok(Self {
            src_switch: isl.src_switch.clone(),
            src_port: port("src_port", isl.src_port)?,
            dst_switch: isl.dst_switch.clone(),
            dst_port: port("dst_port", isl.dst_port)?,
        })
    }
}

/// Topology store collaborator.
///
/// Implemented by [`crate::store::Store`]; tests substitute recording doubles.
pub trait Topology: Send + Sync {
    /// Shortest path of active links between two active switches, at most `max_hops` long.
    ///
    /// Returns `Ok(None)` when no such path exists or either switch is unknown.
    fn shortest_active_path(
        &self,
        src_switch: &str,
        dst_switch: &str,
        max_hops: usize,
    ) -> Result<Option<Vec<IslId>>>;

    /// Resolves a link reference to its endpoint attributes.
    fn resolve_isl(
        &self,
        id: &IslId,
    ) -> Result<LinkAttributes>;

    /// Looks up a switch node by name.
    fn find_switch(
        &self,
        name: &str,
    ) -> Result<Option<data::Switch>>;

    /// Records a directed flow relationship between two switches.
    fn create_flow_relationship(
        &self,
        flow: &data::Flow,
    ) -> Result<bool>;

    /// Deletes a flow relationship. Returns `false` when it did not exist.
    fn remove_flow_relationship(
        &self,
        id: &str,
    ) -> Result<bool>;
}
