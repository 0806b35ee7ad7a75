//! Path provisioning orchestrator.
//!
//! A request moves through
//! `START -> FORWARD_PATH_RESOLVED -> REVERSE_PATH_RESOLVED -> SEGMENTS_COMPILED -> PUBLISHED -> PERSISTED`,
//! or ends in `FAILED`. Each transition is broadcast on the [`Channel`] and
//! persisted by the monitor.

mod monitor;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use serde::Serialize;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::{
    Config, Endpoint, FlowpathError, OutputVlanType, ProvisionRequest, ProvisionResponse, Result, ValidatedRequest,
    allocator::{FlowId, IdAllocator},
    bus::MessageBus,
    common::{MemCache, Shutdown},
    compiler::{FlowCompiler, FlowSegment},
    events::{ProvisionEvent, ProvisionState},
    message::Message,
    runtime::Channel,
    store::{Store, data, query::Query},
    topology::{PathExpander, PathFinder, Topology},
    utils,
};

use monitor::Monitor;

/// Maximum number of provisioned flows kept in memory.
const FLOW_CACHE_SIZE: usize = 2048;

/// A provisioned bidirectional flow.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FlowRecord {
    pub flow_id: FlowId,
    pub forward: Vec<FlowSegment>,
    pub reverse: Vec<FlowSegment>,
    pub forward_transit_vlan: u16,
    pub reverse_transit_vlan: u16,
}

/// Coordinates path discovery, compilation, publication and persistence for each request.
///
/// # Example
///
/// ```rust,ignore
/// let provisioner = ProvisionerBuilder::new().build()?;
/// provisioner.launch();
///
/// let response = provisioner.provision(&ProvisionRequest::new(("A", 10, 100), ("C", 20, 200)));
/// println!("{}", response.to_json()?);
///
/// provisioner.shutdown();
/// ```
pub struct Provisioner {
    config: Config,

    store: Arc<Store>,
    topology: Arc<dyn Topology>,
    bus: Arc<dyn MessageBus>,

    allocator: Arc<IdAllocator>,
    finder: PathFinder,
    expander: PathExpander,
    compiler: FlowCompiler,

    /// Event channel for provisioning state transitions.
    channel: Arc<Channel>,
    /// Background monitor for event persistence.
    monitor: Monitor,
    /// Recently provisioned flows.
    flows: Arc<MemCache<FlowId, Arc<FlowRecord>>>,

    running: Arc<AtomicBool>,
    shutdown: Arc<Shutdown>,
}

/// Tracks one request through the state machine and announces each step.
struct Transitions<'a> {
    flow_id: FlowId,
    state: ProvisionState,
    channel: &'a Channel,
}

impl<'a> Transitions<'a> {
    fn start(
        flow_id: &str,
        channel: &'a Channel,
    ) -> Self {
        let transitions = Self {
            flow_id: flow_id.to_string(),
            state: ProvisionState::Start,
            channel,
        };
        transitions.announce("");
        transitions
    }

    fn advance(
        &mut self,
        to: ProvisionState,
        message: impl Into<String>,
    ) {
        debug_assert!(self.state.can_transition_to(to), "{:?} -> {:?}", self.state, to);
        self.state = to;
        self.announce(message);
    }

    fn fail(
        &mut self,
        err: &FlowpathError,
    ) {
        warn!("flow {} failed after {}: {}", self.flow_id, self.state.as_ref(), err);
        self.advance(ProvisionState::Failed, err.to_string());
    }

    fn announce(
        &self,
        message: impl Into<String>,
    ) {
        let event = ProvisionEvent::new(&self.flow_id, self.state, message);
        debug!("flow {}: {} {}", event.flow_id, event.state.as_ref(), event.message);
        self.channel.emit(&event);
    }
}

impl Provisioner {
    pub(crate) fn new(
        config: Config,
        store: Arc<Store>,
        topology: Arc<dyn Topology>,
        bus: Arc<dyn MessageBus>,
        runtime: Arc<Runtime>,
    ) -> Self {
        let allocator = IdAllocator::new(config.allocator.transit_vlan_min..config.allocator.transit_vlan_max);
        let channel = Arc::new(Channel::new(runtime.clone()));
        let monitor = Monitor::new(store.clone(), channel.clone(), runtime);

        Self {
            finder: PathFinder::new(topology.clone(), config.max_hops),
            expander: PathExpander::new(topology.clone()),
            compiler: FlowCompiler::new(config.flow.bandwidth),
            allocator: Arc::new(allocator),
            config,
            store,
            topology,
            bus,
            channel,
            monitor,
            flows: Arc::new(MemCache::new(FLOW_CACHE_SIZE)),
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Shutdown::new()),
        }
    }

    /// Reserves the transit vlans of every persisted flow relationship.
    pub(crate) fn restore_transit_vlans(&self) -> Result<usize> {
        let flows = self.store.flows()?.query(&Query::all())?.rows;
        let restored = flows
            .iter()
            .filter_map(|flow| u16::try_from(flow.transit_vlan_id).ok())
            .filter(|vlan| self.allocator.reserve_transit_vlan(*vlan))
            .count();
        if restored > 0 {
            info!("restored {} transit vlans from {} flow relationships", restored, flows.len());
        }
        Ok(restored)
    }

    /// Starts event dispatch and persistence.
    pub fn launch(&self) {
        if self.running.swap(true, Ordering::Relaxed) {
            return;
        }

        // Subscribe the monitor before the listener so no event is missed
        self.monitor.monitor();
        self.channel.listen();
    }

    pub fn shutdown(&self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }

        self.shutdown.shutdown();
        self.monitor.shutdown();
        self.channel.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed) && !self.shutdown.is_shutdown()
    }

    /// Provisions a flow and reports the outcome in the caller-facing shape.
    pub fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> ProvisionResponse {
        match self.try_provision(request) {
            Ok(record) => ProvisionResponse::successful(record.flow_id.clone()),
            Err(err) => ProvisionResponse::from(&err),
        }
    }

    /// Provisions a flow between the two endpoints of `request`.
    ///
    /// Malformed input is rejected before any identifier is allocated. Commands
    /// already published are not withdrawn when a later step fails.
    pub fn try_provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<Arc<FlowRecord>> {
        let request = request.validate().inspect_err(|err| warn!("rejected provisioning request: {}", err))?;
        let output_vlan_type = request.output_vlan_type.unwrap_or(self.config.flow.output_vlan_type);

        let flow_id = self.allocator.allocate_flow_id();
        let mut transitions = Transitions::start(&flow_id, &self.channel);

        let vlans = match self.allocate_vlans() {
            Ok(vlans) => vlans,
            Err(err) => {
                transitions.fail(&err);
                return Err(err);
            }
        };

        let mut publish_attempted = false;
        match self.run(&mut transitions, &request, output_vlan_type, vlans, &mut publish_attempted) {
            Ok(record) => {
                let record = Arc::new(record);
                self.flows.set(flow_id.clone(), record.clone());
                info!(
                    "flow {} provisioned {} -> {} over vlans {}/{}",
                    flow_id, request.src.switch_id, request.dst.switch_id, vlans.0, vlans.1
                );
                Ok(record)
            }
            Err(err) => {
                // switches may already carry the tags once anything was sent
                if !publish_attempted {
                    self.allocator.release_transit_vlan(vlans.0);
                    self.allocator.release_transit_vlan(vlans.1);
                }
                transitions.fail(&err);
                Err(err)
            }
        }
    }

    /// A flow provisioned by this instance, while it stays cached.
    pub fn get_flow(
        &self,
        flow_id: &str,
    ) -> Option<Arc<FlowRecord>> {
        self.flows.get(&flow_id.to_string())
    }

    /// Persisted relationships of a flow, forward first.
    pub fn find_flow(
        &self,
        flow_id: &str,
    ) -> Result<Vec<data::Flow>> {
        self.store.find_flow(flow_id)
    }

    /// Persisted state transitions of a flow, oldest first.
    pub fn events(
        &self,
        flow_id: &str,
    ) -> Result<Vec<data::Event>> {
        let page = self.store.events()?.query(&Query::all().eq("flow_id", flow_id).push_order("timestamp", false))?;
        Ok(page.rows)
    }

    pub fn channel(&self) -> Arc<Channel> {
        self.channel.clone()
    }

    pub fn store(&self) -> Arc<Store> {
        self.store.clone()
    }

    pub fn allocator(&self) -> Arc<IdAllocator> {
        self.allocator.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn allocate_vlans(&self) -> Result<(u16, u16)> {
        let forward = self.allocator.allocate_transit_vlan()?;
        match self.allocator.allocate_transit_vlan() {
            Ok(reverse) => Ok((forward, reverse)),
            Err(err) => {
                self.allocator.release_transit_vlan(forward);
                Err(err)
            }
        }
    }

    fn run(
        &self,
        transitions: &mut Transitions<'_>,
        request: &ValidatedRequest,
        output_vlan_type: OutputVlanType,
        (forward_vlan, reverse_vlan): (u16, u16),
        publish_attempted: &mut bool,
    ) -> Result<FlowRecord> {
        let flow_id = transitions.flow_id.clone();
        let (src, dst) = (&request.src, &request.dst);

        let forward_path = self.finder.find_path(&src.switch_id, &dst.switch_id)?;
        transitions.advance(ProvisionState::ForwardPathResolved, format!("{} hops", forward_path.hops()));

        let reverse_path = self.finder.find_path(&dst.switch_id, &src.switch_id)?;
        transitions.advance(ProvisionState::ReversePathResolved, format!("{} hops", reverse_path.hops()));

        let forward = self.compiler.compile(&flow_id, &self.expander.expand(&forward_path)?, src, dst, forward_vlan, output_vlan_type)?;
        let reverse = self.compiler.compile(&flow_id, &self.expander.expand(&reverse_path)?, dst, src, reverse_vlan, output_vlan_type)?;
        transitions.advance(ProvisionState::SegmentsCompiled, format!("{} forward, {} reverse segments", forward.len(), reverse.len()));

        let payloads = forward.iter().chain(reverse.iter()).map(|segment| command_payload(&flow_id, segment)).collect::<Result<Vec<_>>>()?;

        *publish_attempted = true;
        let topic = &self.config.bus.topic;
        for payload in payloads.iter() {
            self.bus.publish(topic, payload.clone()).map_err(|err| match err {
                FlowpathError::Publish(_) => err,
                other => FlowpathError::Publish(other.to_string()),
            })?;
        }
        transitions.advance(ProvisionState::Published, format!("{} commands on {}", payloads.len(), topic));

        self.persist(&flow_id, src, dst, (forward_vlan, reverse_vlan))?;
        transitions.advance(ProvisionState::Persisted, "");

        Ok(FlowRecord {
            flow_id,
            forward,
            reverse,
            forward_transit_vlan: forward_vlan,
            reverse_transit_vlan: reverse_vlan,
        })
    }

    fn persist(
        &self,
        flow_id: &str,
        src: &Endpoint,
        dst: &Endpoint,
        (forward_vlan, reverse_vlan): (u16, u16),
    ) -> Result<()> {
        for endpoint in [src, dst] {
            if self.topology.find_switch(&endpoint.switch_id).map_err(persistence)?.is_none() {
                return Err(FlowpathError::Persistence(format!("switch {} not found", endpoint.switch_id)));
            }
        }

        let forward = relationship(flow_id, "forward", src, dst, forward_vlan);
        let reverse = relationship(flow_id, "reverse", dst, src, reverse_vlan);
        self.create_relationship(&forward)?;

        // both directions are stored or neither is
        if let Err(err) = self.create_relationship(&reverse) {
            if let Err(cleanup) = self.topology.remove_flow_relationship(&forward.id) {
                warn!("fail to remove flow relationship {}: {}", forward.id, cleanup);
            }
            return Err(err);
        }
        Ok(())
    }

    fn create_relationship(
        &self,
        flow: &data::Flow,
    ) -> Result<()> {
        if !self.topology.create_flow_relationship(flow).map_err(persistence)? {
            return Err(FlowpathError::Persistence(format!("flow relationship {} was not created", flow.id)));
        }
        Ok(())
    }
}

fn command_payload(
    flow_id: &str,
    segment: &FlowSegment,
) -> Result<Vec<u8>> {
    Message::command().correlation_id(flow_id).data(segment.clone()).build()?.to_bytes()
}

fn persistence(err: FlowpathError) -> FlowpathError {
    match err {
        FlowpathError::Persistence(_) => err,
        other => FlowpathError::Persistence(other.to_string()),
    }
}

fn relationship(
    flow_id: &str,
    direction: &str,
    src: &Endpoint,
    dst: &Endpoint,
    transit_vlan: u16,
) -> data::Flow {
    data::Flow {
        id: format!("{}-{}", flow_id, direction),
        flow_id: flow_id.to_string(),
        src_switch: src.switch_id.clone(),
        src_port: i64::from(src.port),
        dst_switch: dst.switch_id.clone(),
        dst_port: i64::from(dst.port),
        transit_vlan_id: i64::from(transit_vlan),
        timestamp: utils::time::time_millis(),
    }
}
