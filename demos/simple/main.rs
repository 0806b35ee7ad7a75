use std::sync::Arc;

use flowpath::{
    ChannelEvent, ChannelOptions, Config, ProvisionRequest, ProvisionerBuilder,
    bus::MemBus,
    message::Message,
    store::data::{Isl, Switch},
    topology::LinkState,
};

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let config = Config::load_from_str(include_str!("./config.toml")).unwrap();
    let bus = Arc::new(MemBus::new(config.bus.capacity, config.bus.ack_timeout()));

    let provisioner = ProvisionerBuilder::new().config(config).bus(bus.clone()).build().unwrap();
    provisioner.launch();

    // A -- B -- C, links in both directions
    let store = provisioner.store();
    for name in ["A", "B", "C"] {
        store.switches().unwrap().create(&Switch::new(name, LinkState::Active)).unwrap();
    }
    for (src, sp, dst, dp) in [("A", 1, "B", 2), ("B", 3, "C", 4), ("B", 2, "A", 1), ("C", 4, "B", 3)] {
        store.isls().unwrap().create(&Isl::new(src, sp, dst, dp, LinkState::Active)).unwrap();
    }

    ChannelEvent::channel(provisioner.channel(), ChannelOptions::default())
        .unwrap()
        .on_event(|e| {
            println!("[{}] {} {}", e.flow_id, e.state.as_ref(), e.message);
        })
        .unwrap();

    let request = ProvisionRequest::from_json(include_str!("./request.json")).unwrap();
    let response = provisioner.provision(&request);
    println!("Response: {}", response.to_json().unwrap());

    for record in bus.drain() {
        let Message::Command(cmd) = Message::from_slice(&record.payload).unwrap();
        println!("{}#{}: {:?}", record.topic, record.offset, cmd.data());
    }

    std::thread::sleep(std::time::Duration::from_millis(100));
    provisioner.shutdown();
}
