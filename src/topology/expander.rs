use std::sync::Arc;

use crate::{
    FlowpathError, Result,
    topology::{LinkAttributes, Path, Topology},
};

/// Resolves each link reference of a path into its endpoint attributes.
#[derive(Clone)]
pub struct PathExpander {
    topology: Arc<dyn Topology>,
}

impl PathExpander {
    pub fn new(topology: Arc<dyn Topology>) -> Self {
        Self {
            topology,
        }
    }

    /// Order follows the path. Any unresolvable link fails the whole expansion.
    pub fn expand(
        &self,
        path: &Path,
    ) -> Result<Vec<LinkAttributes>> {
        path.isls
            .iter()
            .map(|id| {
                self.topology.resolve_isl(id).map_err(|err| match err {
                    FlowpathError::Resolution(_) => err,
                    other => FlowpathError::Resolution(format!("{}: {}", id, other)),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        store::{DbStore, MemStore, Store, data::Isl},
        topology::LinkState,
    };

    fn store() -> Arc<Store> {
        let store = Store::new();
        MemStore::new().init(&store).unwrap();
        store.isls().unwrap().create(&Isl::new("A", 1, "B", 2, LinkState::Active)).unwrap();
        store.isls().unwrap().create(&Isl::new("B", 3, "C", 4, LinkState::Active)).unwrap();
        Arc::new(store)
    }

    fn path(isls: &[&str]) -> Path {
        Path {
            src_switch: "A".to_string(),
            dst_switch: "C".to_string(),
            isls: isls.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_expand_keeps_order() {
        let links = PathExpander::new(store()).expand(&path(&["A_1-B_2", "B_3-C_4"])).unwrap();
        assert_eq!(links, vec![LinkAttributes::new("A", 1, "B", 2), LinkAttributes::new("B", 3, "C", 4)]);
    }

    #[test]
    fn test_unresolvable_link_fails() {
        let err = PathExpander::new(store()).expand(&path(&["A_1-B_2", "B_9-C_9"])).unwrap_err();
        assert!(matches!(err, FlowpathError::Resolution(_)));
    }

    #[test]
    fn test_negative_port_is_resolution_error() {
        let store = store();
        store.isls().unwrap().create(&Isl::new("C", -1, "D", 2, LinkState::Active)).unwrap();
        let err = PathExpander::new(store).expand(&path(&["C_-1-D_2"])).unwrap_err();
        assert!(matches!(err, FlowpathError::Resolution(_)));
    }
}
