use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::{
    Config, Provisioner, Result, StoreType,
    bus::{MemBus, MessageBus},
    store::{DbStore, MemStore, PostgresStore, Store},
    topology::Topology,
};

/// Builds a [`Provisioner`], filling every collaborator that was not injected from the config.
#[derive(Default)]
pub struct ProvisionerBuilder {
    config: Config,
    store: Option<Arc<Store>>,
    topology: Option<Arc<dyn Topology>>,
    bus: Option<Arc<dyn MessageBus>>,
    rt: Option<Arc<Runtime>>,
}

impl ProvisionerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn async_worker_thread_number(
        mut self,
        n: u16,
    ) -> Self {
        self.config.async_worker_thread_number = n;
        self
    }

    /// An already initialized store. Skips backend selection from the config.
    pub fn store(
        mut self,
        store: Arc<Store>,
    ) -> Self {
        self.store = Some(store);
        self
    }

    /// Topology used for path queries and persistence. Defaults to the store.
    pub fn topology(
        mut self,
        topology: Arc<dyn Topology>,
    ) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn bus(
        mut self,
        bus: Arc<dyn MessageBus>,
    ) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn runtime(
        mut self,
        runtime: Arc<Runtime>,
    ) -> Self {
        self.rt = Some(runtime);
        self
    }

    pub fn build(self) -> Result<Provisioner> {
        let config = self.config;
        config.validate()?;

        let runtime = match self.rt {
            Some(rt) => rt,
            None => Arc::new(Builder::new_multi_thread().worker_threads(config.async_worker_thread_number.into()).enable_all().build()?),
        };

        let store = match self.store {
            Some(store) => store,
            None => {
                let store = Store::new();
                let db: Box<dyn DbStore> = match (&config.store.store_type, &config.store.postgres) {
                    (StoreType::Postgres, Some(postgres)) => Box::new(PostgresStore::new(&postgres.database_url, runtime.clone())?),
                    _ => Box::new(MemStore::new()),
                };
                db.init(&store)?;
                Arc::new(store)
            }
        };

        let topology = self.topology.unwrap_or_else(|| store.clone() as Arc<dyn Topology>);
        let bus = self.bus.unwrap_or_else(|| Arc::new(MemBus::new(config.bus.capacity, config.bus.ack_timeout())) as Arc<dyn MessageBus>);

        let provisioner = Provisioner::new(config, store, topology, bus, runtime);
        provisioner.restore_transit_vlans()?;
        Ok(provisioner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlowpathError;

    #[test]
    fn test_build_with_defaults() {
        let provisioner = ProvisionerBuilder::new().async_worker_thread_number(1).build().unwrap();
        assert_eq!(provisioner.config().max_hops, 100);
        assert!(provisioner.store().switches().is_ok());
        assert_eq!(provisioner.allocator().range(), 99..4000);
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = Config::default();
        config.max_hops = 0;
        assert!(matches!(ProvisionerBuilder::new().config(config).build(), Err(FlowpathError::Config(_))));
    }
}
