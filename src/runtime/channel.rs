use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use tokio::{runtime::Runtime, sync::broadcast};
use tracing::{trace, warn};

use crate::{
    FlowpathError, Result, ShareLock,
    allocator::FlowId,
    common::{BroadcastQueue, Shutdown},
    events::{Event, ProvisionEvent, ProvisionState},
};

macro_rules! dispatch_event {
    ($handles:expr, $(&$item:ident), +) => {
        if let Ok(handlers) = $handles.read() {
            for handle in handlers.iter() {
                (handle)($(&$item),+);
            }
        }
    };
}

macro_rules! dispatch_event_async {
    ($handles:expr, $(&$item:ident), +) => {
        let handles = $handles.clone();

        tokio::spawn(async move {
            let handlers = match handles.read() {
                Ok(handlers) => handlers.clone(),
                Err(_) => return,
            };
            for handle in handlers.iter() {
                (handle)($(&$item),+).await;
            }
        });
    };
}

const EVENT_QUEUE_SIZE: usize = 2048;

pub type ProvisionEventHandle = Arc<dyn Fn(&Event<ProvisionEvent>) + Send + Sync>;
pub type ProvisionEventHandleAsync = Arc<dyn Fn(&Event<ProvisionEvent>) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// use the glob pattern to match the flow id
    /// eg. 3f2c*
    pub flow_id: String,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            flow_id: "*".to_string(),
        }
    }
}

impl ChannelOptions {
    pub fn with_flow_id(flow_id: impl Into<String>) -> Self {
        Self {
            flow_id: flow_id.into(),
        }
    }
}

/// Broadcasts provisioning events to registered handlers.
#[derive(Clone)]
pub struct Channel {
    event_queue: Arc<BroadcastQueue<Event<ProvisionEvent>>>,

    events: ShareLock<Vec<ProvisionEventHandle>>,
    events_async: ShareLock<Vec<ProvisionEventHandleAsync>>,

    runtime: Arc<Runtime>,
    shutdown: Arc<Shutdown>,
}

impl Channel {
    pub(crate) fn new(runtime: Arc<Runtime>) -> Self {
        Self {
            event_queue: BroadcastQueue::new(EVENT_QUEUE_SIZE),
            events: Arc::new(RwLock::new(Vec::new())),
            events_async: Arc::new(RwLock::new(Vec::new())),
            runtime,
            shutdown: Arc::new(Shutdown::new()),
        }
    }

    pub(crate) fn event_queue(&self) -> Arc<BroadcastQueue<Event<ProvisionEvent>>> {
        self.event_queue.clone()
    }

    /// Publishes an event to every subscriber. Dropped when nobody listens.
    pub(crate) fn emit(
        &self,
        event: &ProvisionEvent,
    ) {
        if self.event_queue.send(Event::new(event)).is_err() {
            trace!("channel::emit({}, {}) without subscribers", event.flow_id, event.state.as_ref());
        }
    }

    pub(crate) fn listen(&self) {
        let mut event_queue = self.event_queue.subscribe();
        let events = self.events.clone();
        let events_async = self.events_async.clone();

        let shutdown = self.shutdown.clone();
        self.runtime.spawn(async move {
            loop {
                let e = tokio::select! {
                    _ = shutdown.wait() => break,
                    received = event_queue.recv() => match received {
                        Ok(e) => e,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("channel listener lagged, {} events not dispatched", skipped);
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                };

                let evt = e.clone();
                dispatch_event!(events, &evt);
                dispatch_event_async!(events_async, &e);
            }
        });
    }

    pub(crate) fn shutdown(&self) {
        self.shutdown.shutdown();
    }
}

/// Registers handlers for events whose flow id matches a glob.
#[derive(Clone)]
pub struct ChannelEvent {
    channel: Arc<Channel>,

    glob: globset::GlobMatcher,
}

impl ChannelEvent {
    pub fn channel(
        channel: Arc<Channel>,
        options: ChannelOptions,
    ) -> Result<Self> {
        let glob = globset::Glob::new(&options.flow_id).map_err(|e| FlowpathError::Config(e.to_string()))?.compile_matcher();
        Ok(Self {
            channel,
            glob,
        })
    }

    /// Called once per flow that reached `Persisted`.
    pub fn on_persisted(
        &self,
        f: impl Fn(FlowId) + Send + Sync + 'static,
    ) -> Result<()> {
        let glob = self.glob.clone();

        self.register(Arc::new(move |e| {
            if e.state == ProvisionState::Persisted && glob.is_match(&e.flow_id) {
                f(e.flow_id.clone());
            }
        }))
    }

    pub fn on_failed(
        &self,
        f: impl Fn(&Event<ProvisionEvent>) + Send + Sync + 'static,
    ) -> Result<()> {
        let glob = self.glob.clone();

        self.register(Arc::new(move |e| {
            if e.state == ProvisionState::Failed && glob.is_match(&e.flow_id) {
                f(e);
            }
        }))
    }

    pub fn on_event(
        &self,
        f: impl Fn(&Event<ProvisionEvent>) + Send + Sync + 'static,
    ) -> Result<()> {
        let glob = self.glob.clone();

        self.register(Arc::new(move |e| {
            if glob.is_match(&e.flow_id) {
                f(e);
            }
        }))
    }

    pub fn on_event_async<F>(
        &self,
        f: F,
    ) -> Result<()>
    where
        F: Fn(&Event<ProvisionEvent>) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let glob = self.glob.clone();

        let mut handlers = self.channel.events_async.write().map_err(|e| FlowpathError::Queue(e.to_string()))?;
        handlers.push(Arc::new(move |e| {
            if glob.is_match(&e.flow_id) {
                f(e)
            } else {
                Box::pin(async {})
            }
        }));
        Ok(())
    }

    fn register(
        &self,
        handle: ProvisionEventHandle,
    ) -> Result<()> {
        let mut handlers = self.channel.events.write().map_err(|e| FlowpathError::Queue(e.to_string()))?;
        handlers.push(handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use tokio::runtime::Builder;

    use super::*;

    fn runtime() -> Arc<Runtime> {
        Arc::new(Builder::new_multi_thread().worker_threads(1).enable_all().build().unwrap())
    }

    fn wait_for(
        f: impl Fn() -> bool,
        timeout: Duration,
    ) -> bool {
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            if f() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        f()
    }

    #[test]
    fn test_handlers_filter_by_flow_id() {
        let channel = Arc::new(Channel::new(runtime()));
        channel.listen();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let persisted = Arc::new(Mutex::new(Vec::new()));
        let failed = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::with_flow_id("f-1*"))
            .unwrap()
            .on_event(move |e| s.lock().unwrap().push(e.state))
            .unwrap();
        let p = persisted.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::default()).unwrap().on_persisted(move |id| p.lock().unwrap().push(id)).unwrap();
        let f = failed.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::default()).unwrap().on_failed(move |e| f.lock().unwrap().push(e.message.clone())).unwrap();

        channel.emit(&ProvisionEvent::new("f-1a", ProvisionState::Start, ""));
        channel.emit(&ProvisionEvent::new("f-1a", ProvisionState::Persisted, ""));
        channel.emit(&ProvisionEvent::new("f-2", ProvisionState::Failed, "no path"));

        assert!(wait_for(|| seen.lock().unwrap().len() == 2 && failed.lock().unwrap().len() == 1, Duration::from_secs(2)));
        assert_eq!(*seen.lock().unwrap(), vec![ProvisionState::Start, ProvisionState::Persisted]);
        assert_eq!(*persisted.lock().unwrap(), vec!["f-1a".to_string()]);
        assert_eq!(*failed.lock().unwrap(), vec!["no path".to_string()]);
        channel.shutdown();
    }

    #[test]
    fn test_async_handlers_filter_by_flow_id() {
        let channel = Arc::new(Channel::new(runtime()));
        channel.listen();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::with_flow_id("f-1*"))
            .unwrap()
            .on_event_async(move |e| {
                let s = s.clone();
                let flow_id = e.flow_id.clone();
                Box::pin(async move {
                    s.lock().unwrap().push(flow_id);
                })
            })
            .unwrap();

        channel.emit(&ProvisionEvent::new("f-1a", ProvisionState::Start, ""));
        channel.emit(&ProvisionEvent::new("f-2", ProvisionState::Start, ""));
        channel.emit(&ProvisionEvent::new("f-1b", ProvisionState::Failed, "no path"));

        assert!(wait_for(|| seen.lock().unwrap().len() == 2, Duration::from_secs(2)));
        std::thread::sleep(Duration::from_millis(50));

        let mut flows = seen.lock().unwrap().clone();
        flows.sort();
        assert_eq!(flows, vec!["f-1a".to_string(), "f-1b".to_string()]);
        channel.shutdown();
    }

    #[test]
    fn test_listener_recovers_after_lag() {
        let channel = Arc::new(Channel::new(runtime()));
        channel.listen();

        let late = Arc::new(Mutex::new(0));
        ChannelEvent::channel(channel.clone(), ChannelOptions::with_flow_id("burst-*"))
            .unwrap()
            .on_event(|_| std::thread::sleep(Duration::from_millis(1)))
            .unwrap();
        let l = late.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::with_flow_id("late"))
            .unwrap()
            .on_event(move |_| *l.lock().unwrap() += 1)
            .unwrap();

        for i in 0..(EVENT_QUEUE_SIZE * 2 + 1000) {
            channel.emit(&ProvisionEvent::new(&format!("burst-{}", i), ProvisionState::Start, ""));
        }
        channel.emit(&ProvisionEvent::new("late", ProvisionState::Start, ""));

        assert!(wait_for(|| *late.lock().unwrap() == 1, Duration::from_secs(20)));
        channel.shutdown();
    }

    #[test]
    fn test_invalid_glob() {
        let channel = Arc::new(Channel::new(runtime()));
        assert!(matches!(ChannelEvent::channel(channel, ChannelOptions::with_flow_id("[")), Err(FlowpathError::Config(_))));
    }
}
