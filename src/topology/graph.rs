//! In-memory graph of the active topology used to answer shortest path queries.

use std::collections::HashMap;

use petgraph::{
    algo::astar,
    graph::{DiGraph, NodeIndex},
};

use crate::{
    store::data::{Isl, Switch},
    topology::IslId,
};

/// Directed graph of switches connected by links.
///
/// Only the records handed to [`TopologyGraph::build`] are included; the caller
/// is expected to pass active switches and active links only.
pub struct TopologyGraph {
    graph: DiGraph<String, IslId>,
    nodes: HashMap<String, NodeIndex>,
}

impl TopologyGraph {
    /// Builds the graph. Links whose endpoints are not among `switches` are dropped.
    pub fn build(
        switches: &[Switch],
        isls: &[Isl],
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        for switch in switches {
            nodes.entry(switch.id.clone()).or_insert_with(|| graph.add_node(switch.id.clone()));
        }

        for isl in isls {
            if let (Some(src), Some(dst)) = (nodes.get(&isl.src_switch), nodes.get(&isl.dst_switch)) {
                graph.add_edge(*src, *dst, isl.id.clone());
            }
        }

        Self {
            graph,
            nodes,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Fewest-hop path from `src` to `dst` as link ids.
    ///
    /// Returns `None` when either switch is absent, when `src == dst`, or when
    /// the shortest path is longer than `max_hops`. Among equal-length paths and
    /// parallel links the choice is unspecified.
    pub fn shortest_path(
        &self,
        src: &str,
        dst: &str,
        max_hops: usize,
    ) -> Option<Vec<IslId>> {
        let src_idx = *self.nodes.get(src)?;
        let dst_idx = *self.nodes.get(dst)?;
        if src_idx == dst_idx {
            return None;
        }

        let (hops, nodes) = astar(&self.graph, src_idx, |n| n == dst_idx, |_| 1usize, |_| 0usize)?;
        if hops > max_hops {
            return None;
        }

        nodes.windows(2).map(|pair| self.graph.find_edge(pair[0], pair[1]).map(|e| self.graph[e].clone())).collect()
    }
}
