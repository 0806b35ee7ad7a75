use std::sync::Arc;

use tracing::debug;

use crate::{
    FlowpathError, Result,
    topology::{Path, Topology},
};

/// Finds the shortest path of active links between two switches.
#[derive(Clone)]
pub struct PathFinder {
    topology: Arc<dyn Topology>,
    max_hops: usize,
}

impl PathFinder {
    pub fn new(
        topology: Arc<dyn Topology>,
        max_hops: usize,
    ) -> Self {
        Self {
            topology,
            max_hops,
        }
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// Returns `PathNotFound` when the store yields no path or an empty one.
    pub fn find_path(
        &self,
        src_switch: &str,
        dst_switch: &str,
    ) -> Result<Path> {
        let not_found = || FlowpathError::PathNotFound {
            src: src_switch.to_string(),
            dst: dst_switch.to_string(),
        };

        let isls = self.topology.shortest_active_path(src_switch, dst_switch, self.max_hops)?.ok_or_else(not_found)?;
        if isls.is_empty() {
            return Err(not_found());
        }

        debug!("path {} -> {}: {} hops", src_switch, dst_switch, isls.len());
        Ok(Path {
            src_switch: src_switch.to_string(),
            dst_switch: dst_switch.to_string(),
            isls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        store::{DbStore, MemStore, Store, data::*},
        topology::LinkState,
    };

    fn topology(
        switches: &[(&str, LinkState)],
        isls: &[Isl],
    ) -> Arc<Store> {
        let store = Store::new();
        MemStore::new().init(&store).unwrap();
        for (name, state) in switches {
            store.switches().unwrap().create(&Switch::new(*name, *state)).unwrap();
        }
        for isl in isls {
            store.isls().unwrap().create(isl).unwrap();
        }
        Arc::new(store)
    }

    #[test]
    fn test_find_path() {
        let store = topology(
            &[("A", LinkState::Active), ("B", LinkState::Active), ("C", LinkState::Active)],
            &[Isl::new("A", 1, "B", 2, LinkState::Active), Isl::new("B", 3, "C", 4, LinkState::Active)],
        );
        let path = PathFinder::new(store, 100).find_path("A", "C").unwrap();
        assert_eq!(path.hops(), 2);
        assert_eq!(path.isls, vec!["A_1-B_2".to_string(), "B_3-C_4".to_string()]);
        assert_eq!(path.src_switch, "A");
        assert_eq!(path.dst_switch, "C");
    }

    #[test]
    fn test_inactive_link_is_skipped() {
        let store = topology(
            &[("A", LinkState::Active), ("B", LinkState::Active), ("C", LinkState::Active)],
            &[
                Isl::new("A", 9, "C", 9, LinkState::Inactive),
                Isl::new("A", 1, "B", 2, LinkState::Active),
                Isl::new("B", 3, "C", 4, LinkState::Active),
            ],
        );
        let path = PathFinder::new(store, 100).find_path("A", "C").unwrap();
        assert_eq!(path.hops(), 2);
    }

    #[test]
    fn test_inactive_switch_breaks_path() {
        let store = topology(
            &[("A", LinkState::Active), ("B", LinkState::Inactive), ("C", LinkState::Active)],
            &[Isl::new("A", 1, "B", 2, LinkState::Active), Isl::new("B", 3, "C", 4, LinkState::Active)],
        );
        let err = PathFinder::new(store, 100).find_path("A", "C").unwrap_err();
        assert!(matches!(err, FlowpathError::PathNotFound { .. }));
        assert_eq!(err.to_string(), "unable to find valid path in the network");
    }

    #[test]
    fn test_unknown_switch() {
        let store = topology(&[("A", LinkState::Active)], &[]);
        let err = PathFinder::new(store, 100).find_path("A", "Z").unwrap_err();
        assert_eq!(
            err,
            FlowpathError::PathNotFound {
                src: "A".to_string(),
                dst: "Z".to_string()
            }
        );
    }

    #[test]
    fn test_hop_bound() {
        let store = topology(
            &[("A", LinkState::Active), ("B", LinkState::Active), ("C", LinkState::Active)],
            &[Isl::new("A", 1, "B", 2, LinkState::Active), Isl::new("B", 3, "C", 4, LinkState::Active)],
        );
        assert!(PathFinder::new(store.clone(), 1).find_path("A", "C").is_err());
        assert!(PathFinder::new(store, 2).find_path("A", "C").is_ok());
    }
}
