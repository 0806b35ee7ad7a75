use std::{
    any::Any,
    collections::HashMap,
    convert::AsRef,
    sync::{Arc, RwLock},
};

use tracing::trace;

use crate::{
    FlowpathError, Result, ShareLock,
    topology::{IslId, LinkAttributes, LinkState, Topology, TopologyGraph},
};

use super::{DbCollection, DbCollectionIden, StoreIden, data::*, query::Query};

#[derive(Clone)]
pub struct DynDbSetRef<T>(Arc<dyn DbCollection<Item = T>>);

pub struct Store {
    collections: ShareLock<HashMap<StoreIden, Arc<dyn Any + Send + Sync + 'static>>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn collection<DATA>(&self) -> Result<Arc<dyn DbCollection<Item = DATA>>>
    where
        DATA: DbCollectionIden + Send + Sync + 'static,
    {
        let collections = self.collections.read().map_err(|e| FlowpathError::Store(e.to_string()))?;

        let collection =
            collections.get(&DATA::iden()).ok_or_else(|| FlowpathError::Store(format!("fail to get collection: {}", DATA::iden().as_ref())))?;

        collection
            .downcast_ref::<DynDbSetRef<DATA>>()
            .map(|v| v.0.clone())
            .ok_or_else(|| FlowpathError::Store(format!("fail to get collection: {}", DATA::iden().as_ref())))
    }

    pub fn register<DATA>(
        &self,
        collection: Arc<dyn DbCollection<Item = DATA> + Send + Sync + 'static>,
    ) -> Result<()>
    where
        DATA: DbCollectionIden + 'static,
    {
        let mut collections = self.collections.write().map_err(|e| FlowpathError::Store(e.to_string()))?;
        collections.insert(DATA::iden(), Arc::new(DynDbSetRef::<DATA>(collection)));
        Ok(())
    }

    pub fn switches(&self) -> Result<Arc<dyn DbCollection<Item = Switch>>> {
        self.collection()
    }

    pub fn isls(&self) -> Result<Arc<dyn DbCollection<Item = Isl>>> {
        self.collection()
    }

    pub fn flows(&self) -> Result<Arc<dyn DbCollection<Item = Flow>>> {
        self.collection()
    }

    pub fn events(&self) -> Result<Arc<dyn DbCollection<Item = Event>>> {
        self.collection()
    }

    /// Both persisted directions of a flow, forward first.
    pub fn find_flow(
        &self,
        flow_id: &str,
    ) -> Result<Vec<Flow>> {
        trace!("store::find_flow({})", flow_id);
        let page = self.flows()?.query(&Query::all().eq("flow_id", flow_id).push_order("id", false))?;
        Ok(page.rows)
    }

    /// Flows entering or leaving the network at `switch_id:port`.
    pub fn find_flows_by_endpoint(
        &self,
        switch_id: &str,
        port: u32,
    ) -> Result<Vec<Flow>> {
        trace!("store::find_flows_by_endpoint({}, {})", switch_id, port);
        let flows = self.flows()?;
        let mut rows = flows.query(&Query::all().eq("src_switch", switch_id).eq("src_port", port))?.rows;
        rows.extend(flows.query(&Query::all().eq("dst_switch", switch_id).eq("dst_port", port))?.rows);
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows.dedup_by(|a, b| a.id == b.id);
        Ok(rows)
    }
}

impl Topology for Store {
    fn shortest_active_path(
        &self,
        src_switch: &str,
        dst_switch: &str,
        max_hops: usize,
    ) -> Result<Option<Vec<IslId>>> {
        trace!("store::shortest_active_path({}, {}, {})", src_switch, dst_switch, max_hops);
        let active = LinkState::Active.as_ref();
        let switches = self.switches()?.query(&Query::all().eq("state", active))?.rows;
        let isls = self.isls()?.query(&Query::all().eq("state", active))?.rows;

        let graph = TopologyGraph::build(&switches, &isls);
        Ok(graph.shortest_path(src_switch, dst_switch, max_hops))
    }

    fn resolve_isl(
        &self,
        id: &IslId,
    ) -> Result<LinkAttributes> {
        trace!("store::resolve_isl({})", id);
        let isl = self.isls()?.find(id).map_err(|e| FlowpathError::Resolution(format!("{}: {}", id, e)))?;
        LinkAttributes::try_from(&isl)
    }

    fn find_switch(
        &self,
        name: &str,
    ) -> Result<Option<Switch>> {
        trace!("store::find_switch({})", name);
        let switches = self.switches()?;
        if !switches.exists(name)? {
            return Ok(None);
        }
        switches.find(name).map(Some)
    }

    fn create_flow_relationship(
        &self,
        flow: &Flow,
    ) -> Result<bool> {
        trace!("store::create_flow_relationship({})", flow.id);
        self.flows()?.create(flow)
    }

    fn remove_flow_relationship(
        &self,
        id: &str,
    ) -> Result<bool> {
        trace!("store::remove_flow_relationship({})", id);
        self.flows()?.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DbStore, MemStore};

    fn store() -> Store {
        let store = Store::new();
        MemStore::new().init(&store).unwrap();
        store
    }

    fn flow(
        id: &str,
        flow_id: &str,
        src: (&str, i64),
        dst: (&str, i64),
    ) -> Flow {
        Flow {
            id: id.to_string(),
            flow_id: flow_id.to_string(),
            src_switch: src.0.to_string(),
            src_port: src.1,
            dst_switch: dst.0.to_string(),
            dst_port: dst.1,
            transit_vlan_id: 0,
            timestamp: 0,
        }
    }

    #[test]
    fn test_unregistered_collection_is_an_error() {
        let store = Store::new();
        assert!(matches!(store.switches(), Err(FlowpathError::Store(_))));
    }

    #[test]
    fn test_find_switch() {
        let store = store();
        store.switches().unwrap().create(&Switch::new("A", LinkState::Active)).unwrap();
        assert_eq!(store.find_switch("A").unwrap().map(|s| s.id), Some("A".to_string()));
        assert_eq!(store.find_switch("Z").unwrap(), None);
    }

    #[test]
    fn test_resolve_missing_isl() {
        let store = store();
        let err = store.resolve_isl(&"A_1-B_2".to_string()).unwrap_err();
        assert!(matches!(err, FlowpathError::Resolution(_)));
    }

    #[test]
    fn test_find_flow_returns_both_directions() {
        let store = store();
        store.create_flow_relationship(&flow("f1-reverse", "f1", ("C", 20), ("A", 10))).unwrap();
        store.create_flow_relationship(&flow("f1-forward", "f1", ("A", 10), ("C", 20))).unwrap();
        store.create_flow_relationship(&flow("f2-forward", "f2", ("A", 11), ("B", 30))).unwrap();

        let flows = store.find_flow("f1").unwrap();
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].id, "f1-forward");
        assert_eq!(flows[1].id, "f1-reverse");
    }

    #[test]
    fn test_find_flows_by_endpoint() {
        let store = store();
        store.create_flow_relationship(&flow("f1-forward", "f1", ("A", 10), ("C", 20))).unwrap();
        store.create_flow_relationship(&flow("f1-reverse", "f1", ("C", 20), ("A", 10))).unwrap();
        store.create_flow_relationship(&flow("f2-forward", "f2", ("A", 11), ("B", 30))).unwrap();

        let flows = store.find_flows_by_endpoint("A", 10).unwrap();
        assert_eq!(flows.iter().map(|f| f.id.as_str()).collect::<Vec<_>>(), vec!["f1-forward", "f1-reverse"]);
        assert!(store.find_flows_by_endpoint("B", 10).unwrap().is_empty());
    }
}
