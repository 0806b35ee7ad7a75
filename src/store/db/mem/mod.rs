mod collect;
mod r#impl;

use std::{collections::HashMap, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;

use crate::{
    Result,
    store::{DbCollection, DbStore, Store, data::*},
};
pub use collect::Collect;

#[derive(Debug, Clone)]
pub struct MemStore {
    switches: Arc<Collect<Switch>>,
    isls: Arc<Collect<Isl>>,
    flows: Arc<Collect<Flow>>,
    events: Arc<Collect<Event>>,
}

trait DbDocument: Serialize + DeserializeOwned {
    fn id(&self) -> &str;
    fn doc(&self) -> Result<HashMap<String, JsonValue>>;
}

impl DbStore for MemStore {
    fn init(
        &self,
        s: &Store,
    ) -> Result<()> {
        s.register(self.switches())?;
        s.register(self.isls())?;
        s.register(self.flows())?;
        s.register(self.events())?;
        Ok(())
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        let switches = Collect::new("switches");
        let isls = Collect::new("isls");
        let flows = Collect::new("flows");
        let events = Collect::new("events");

        Self {
            switches: Arc::new(switches),
            isls: Arc::new(isls),
            flows: Arc::new(flows),
            events: Arc::new(events),
        }
    }

    pub fn switches(&self) -> Arc<dyn DbCollection<Item = Switch> + Send + Sync> {
        self.switches.clone()
    }

    pub fn isls(&self) -> Arc<dyn DbCollection<Item = Isl> + Send + Sync> {
        self.isls.clone()
    }

    pub fn flows(&self) -> Arc<dyn DbCollection<Item = Flow> + Send + Sync> {
        self.flows.clone()
    }

    pub fn events(&self) -> Arc<dyn DbCollection<Item = Event> + Send + Sync> {
        self.events.clone()
    }
}
