use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::warn;

use crate::{
    common::Shutdown,
    runtime::Channel,
    store::{Store, data},
    utils,
};

/// Persists every provisioning event to the store's `events` collection.
pub struct Monitor {
    store: Arc<Store>,
    channel: Arc<Channel>,

    runtime: Arc<Runtime>,
    shutdown: Arc<Shutdown>,
}

impl Monitor {
    pub fn new(
        store: Arc<Store>,
        channel: Arc<Channel>,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            store,
            channel,
            runtime,
            shutdown: Arc::new(Shutdown::new()),
        }
    }

    pub fn monitor(&self) {
        let store = self.store.clone();
        let shutdown = self.shutdown.clone();
        let mut event_queue = self.channel.event_queue().subscribe();

        self.runtime.spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = shutdown.wait() => break,
                    received = event_queue.recv() => match received {
                        Ok(event) => event,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("monitor lagged, {} events not persisted", skipped);
                            continue;
                        }
                        Err(_) => break,
                    },
                };

                let record = data::Event {
                    id: utils::longid(),
                    flow_id: event.flow_id.clone(),
                    state: event.state.as_ref().to_string(),
                    message: event.message.clone(),
                    timestamp: event.timestamp,
                };
                if let Err(err) = store.events().and_then(|events| events.create(&record)) {
                    warn!("fail to persist event {} of flow {}: {}", record.state, record.flow_id, err);
                }
            }
        });
    }

    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }
}
