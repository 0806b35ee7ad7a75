use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::{
    Result,
    store::{DbCollection, DbStore, Store, data::*, map_db_err},
};

use super::{DbInit, collection::*, synclient::SynClient};

pub struct PostgresStore {
    switches: Arc<SwitchCollection>,
    isls: Arc<IslCollection>,
    flows: Arc<FlowCollection>,
    events: Arc<EventCollection>,
}

impl DbStore for PostgresStore {
    fn init(
        &self,
        s: &Store,
    ) -> Result<()> {
        self.switches.init()?;
        self.isls.init()?;
        self.flows.init()?;
        self.events.init()?;

        s.register(self.switches())?;
        s.register(self.isls())?;
        s.register(self.flows())?;
        s.register(self.events())?;
        Ok(())
    }
}

impl PostgresStore {
    pub fn new(
        db_url: &str,
        runtime: Arc<Runtime>,
    ) -> Result<Self> {
        let conn = Arc::new(SynClient::connect(db_url, runtime).map_err(map_db_err)?);

        Ok(Self {
            switches: Arc::new(SwitchCollection::new(&conn)),
            isls: Arc::new(IslCollection::new(&conn)),
            flows: Arc::new(FlowCollection::new(&conn)),
            events: Arc::new(EventCollection::new(&conn)),
        })
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
