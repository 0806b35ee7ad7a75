use std::sync::Arc;

use flowpath::{
    Config, ProvisionRequest, ProvisionerBuilder,
    bus::MemBus,
    store::data::{Isl, Switch},
    topology::LinkState,
};

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let config = Config::load_from_str(include_str!("./config.toml")).unwrap();
    let bus = Arc::new(MemBus::new(config.bus.capacity, config.bus.ack_timeout()));

    let provisioner = ProvisionerBuilder::new().config(config).bus(bus.clone()).build().unwrap();
    provisioner.launch();

    let store = provisioner.store();
    for name in ["A", "B", "C"] {
        if !store.switches().unwrap().exists(name).unwrap() {
            store.switches().unwrap().create(&Switch::new(name, LinkState::Active)).unwrap();
        }
    }
    for (src, sp, dst, dp) in [("A", 1, "B", 2), ("B", 3, "C", 4), ("B", 2, "A", 1), ("C", 4, "B", 3)] {
        let isl = Isl::new(src, sp, dst, dp, LinkState::Active);
        if !store.isls().unwrap().exists(&isl.id).unwrap() {
            store.isls().unwrap().create(&isl).unwrap();
        }
    }

    let response = provisioner.provision(&ProvisionRequest::new(("A", 10, 100), ("C", 20, 200)));
    println!("Response: {}", response.to_json().unwrap());

    if let Some(flow_id) = response.flow_id.as_deref() {
        for flow in provisioner.find_flow(flow_id).unwrap() {
            println!("Persisted: {} {}:{} -> {}:{}", flow.id, flow.src_switch, flow.src_port, flow.dst_switch, flow.dst_port);
        }
    }
    println!("Published {} commands", bus.drain().len());

    std::thread::sleep(std::time::Duration::from_millis(100));
    for event in response.flow_id.as_deref().map(|id| provisioner.events(id).unwrap()).unwrap_or_default() {
        println!("Event: {} {}", event.state, event.message);
    }
    provisioner.shutdown();
}
