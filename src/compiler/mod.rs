//! Compiles an expanded path into per-switch flow segments.

mod segment;

use tracing::warn;

use crate::{Endpoint, FlowpathError, OutputVlanType, Result, topology::LinkAttributes};

pub use segment::{CONTROLLER, EgressFlow, FlowCommand, FlowSegment, IngressFlow, TransitFlow};

/// Pure compiler from link sequence to `FlowSegment`s. Performs no I/O.
#[derive(Debug, Clone)]
pub struct FlowCompiler {
    bandwidth: u64,
}

impl FlowCompiler {
    pub fn new(bandwidth: u64) -> Self {
        Self {
            bandwidth,
        }
    }

    /// Produces `links.len() + 1` segments in traversal order: ingress, transit per interior hop, egress.
    ///
    /// Ingress output and egress input ports come from scanning `links` for the
    /// endpoint switch; when several links match, the last one wins.
    pub fn compile(
        &self,
        flow_id: &str,
        links: &[LinkAttributes],
        src: &Endpoint,
        dst: &Endpoint,
        transit_vlan: u16,
        output_vlan_type: OutputVlanType,
    ) -> Result<Vec<FlowSegment>> {
        if links.is_empty() {
            return Err(FlowpathError::Resolution(format!("empty path {} -> {}", src.switch_id, dst.switch_id)));
        }

        let mut segments = Vec::with_capacity(links.len() + 1);

        let output_port = last_match(links, &src.switch_id, |l| &l.src_switch, |l| l.src_port)?;
        segments.push(FlowSegment::Ingress(IngressFlow {
            destination: CONTROLLER.to_string(),
            flow_name: flow_id.to_string(),
            switch_id: src.switch_id.clone(),
            input_port: src.port,
            output_port,
            input_vlan_id: src.vlan,
            transit_vlan_id: transit_vlan,
            bandwidth: self.bandwidth,
        }));

        for hop in links.windows(2) {
            segments.push(FlowSegment::Transit(TransitFlow {
                destination: CONTROLLER.to_string(),
                flow_name: flow_id.to_string(),
                switch_id: hop[0].dst_switch.clone(),
                input_port: hop[0].dst_port,
                output_port: hop[1].src_port,
                transit_vlan_id: transit_vlan,
            }));
        }

        let input_port = last_match(links, &dst.switch_id, |l| &l.dst_switch, |l| l.dst_port)?;
        segments.push(FlowSegment::Egress(EgressFlow {
            destination: CONTROLLER.to_string(),
            flow_name: flow_id.to_string(),
            switch_id: dst.switch_id.clone(),
            input_port,
            output_port: dst.port,
            transit_vlan_id: transit_vlan,
            output_vlan_id: dst.vlan,
            output_vlan_type,
        }));

        Ok(segments)
    }
}

fn last_match(
    links: &[LinkAttributes],
    switch_id: &str,
    switch: impl Fn(&LinkAttributes) -> &String,
    port: impl Fn(&LinkAttributes) -> u32,
) -> Result<u32> {
    let matches = links.iter().filter(|l| switch(*l) == switch_id).map(&port).collect::<Vec<_>>();
    if matches.len() > 1 {
        warn!("switch {} matches {} links in path, using the last one", switch_id, matches.len());
    }
    matches.last().copied().ok_or_else(|| FlowpathError::Resolution(format!("no link in path touches switch {}", switch_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(
        switch_id: &str,
        port: u32,
        vlan: u16,
    ) -> Endpoint {
        Endpoint {
            switch_id: switch_id.to_string(),
            port,
            vlan,
        }
    }

    fn chain(len: usize) -> Vec<LinkAttributes> {
        (0..len).map(|i| LinkAttributes::new(format!("S{}", i), (i * 2 + 1) as u32, format!("S{}", i + 1), (i * 2 + 2) as u32)).collect()
    }

    #[test]
    fn test_compile_three_switch_path() {
        let links = vec![LinkAttributes::new("A", 1, "B", 2), LinkAttributes::new("B", 3, "C", 4)];
        let segments = FlowCompiler::new(10000)
            .compile("f-1", &links, &endpoint("A", 10, 100), &endpoint("C", 20, 200), 150, OutputVlanType::Push)
            .unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[0],
            FlowSegment::Ingress(IngressFlow {
                destination: "CONTROLLER".to_string(),
                flow_name: "f-1".to_string(),
                switch_id: "A".to_string(),
                input_port: 10,
                output_port: 1,
                input_vlan_id: 100,
                transit_vlan_id: 150,
                bandwidth: 10000,
            })
        );
        assert_eq!(
            segments[1],
            FlowSegment::Transit(TransitFlow {
                destination: "CONTROLLER".to_string(),
                flow_name: "f-1".to_string(),
                switch_id: "B".to_string(),
                input_port: 2,
                output_port: 3,
                transit_vlan_id: 150,
            })
        );
        assert_eq!(
            segments[2],
            FlowSegment::Egress(EgressFlow {
                destination: "CONTROLLER".to_string(),
                flow_name: "f-1".to_string(),
                switch_id: "C".to_string(),
                input_port: 4,
                output_port: 20,
                transit_vlan_id: 150,
                output_vlan_id: 200,
                output_vlan_type: OutputVlanType::Push,
            })
        );
    }

    #[test]
    fn test_segment_count_and_roles() {
        let compiler = FlowCompiler::new(10000);
        for n in 1..=12 {
            let links = chain(n);
            let dst = format!("S{}", n);
            let segments = compiler.compile("f", &links, &endpoint("S0", 10, 100), &endpoint(&dst, 20, 200), 99, OutputVlanType::Pop).unwrap();

            assert_eq!(segments.len(), n + 1);
            assert_eq!(segments[0].command(), FlowCommand::Ingress);
            assert_eq!(segments[n].command(), FlowCommand::Egress);
            assert!(segments[1..n].iter().all(|s| s.command() == FlowCommand::Transit));
            assert!(segments.iter().all(|s| s.transit_vlan_id() == 99 && s.flow_name() == "f"));

            // traversal order: segment i sits on switch Si
            for (i, segment) in segments.iter().enumerate() {
                assert_eq!(segment.switch_id(), format!("S{}", i));
            }
        }
    }

    #[test]
    fn test_single_hop_has_no_transit() {
        let links = vec![LinkAttributes::new("A", 1, "B", 2)];
        let segments = FlowCompiler::new(10000)
            .compile("f", &links, &endpoint("A", 10, 100), &endpoint("B", 20, 200), 99, OutputVlanType::None)
            .unwrap();
        assert_eq!(segments.iter().map(|s| s.command()).collect::<Vec<_>>(), vec![FlowCommand::Ingress, FlowCommand::Egress]);
        assert_eq!(segments[0].output_port(), 1);
        assert_eq!(segments[1].input_port(), 2);
    }

    #[test]
    fn test_last_match_wins() {
        // A appears as a source twice: A->B then back through A->C
        let links = vec![LinkAttributes::new("A", 1, "B", 2), LinkAttributes::new("B", 3, "A", 4), LinkAttributes::new("A", 5, "C", 6)];
        let segments = FlowCompiler::new(10000)
            .compile("f", &links, &endpoint("A", 10, 100), &endpoint("C", 20, 200), 99, OutputVlanType::Push)
            .unwrap();
        assert_eq!(segments[0].output_port(), 5);
    }

    #[test]
    fn test_endpoint_not_on_path() {
        let links = vec![LinkAttributes::new("A", 1, "B", 2)];
        let err = FlowCompiler::new(10000)
            .compile("f", &links, &endpoint("X", 10, 100), &endpoint("B", 20, 200), 99, OutputVlanType::Push)
            .unwrap_err();
        assert!(matches!(err, FlowpathError::Resolution(_)));
    }

    #[test]
    fn test_empty_path() {
        let err = FlowCompiler::new(10000)
            .compile("f", &[], &endpoint("A", 10, 100), &endpoint("B", 20, 200), 99, OutputVlanType::Push)
            .unwrap_err();
        assert!(matches!(err, FlowpathError::Resolution(_)));
    }
}
