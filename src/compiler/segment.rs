use serde::{Deserialize, Serialize};

use crate::OutputVlanType;

/// Every segment is addressed to the controller that programs the switch.
pub const CONTROLLER: &str = "CONTROLLER";

/// Role of a segment along the path.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
pub enum FlowCommand {
    #[serde(rename = "install_ingress_flow")]
    #[strum(serialize = "install_ingress_flow")]
    Ingress,
    #[serde(rename = "install_transit_flow")]
    #[strum(serialize = "install_transit_flow")]
    Transit,
    #[serde(rename = "install_egress_flow")]
    #[strum(serialize = "install_egress_flow")]
    Egress,
}

/// Rule for the switch where customer traffic enters the path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IngressFlow {
    pub destination: String,
    pub flow_name: String,
    pub switch_id: String,
    pub input_port: u32,
    pub output_port: u32,
    pub input_vlan_id: u16,
    pub transit_vlan_id: u16,
    pub bandwidth: u64,
}

/// Rule for an intermediate switch forwarding on the transit vlan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TransitFlow {
    pub destination: String,
    pub flow_name: String,
    pub switch_id: String,
    pub input_port: u32,
    pub output_port: u32,
    pub transit_vlan_id: u16,
}

/// Rule for the switch where traffic leaves the path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EgressFlow {
    pub destination: String,
    pub flow_name: String,
    pub switch_id: String,
    pub input_port: u32,
    pub output_port: u32,
    pub transit_vlan_id: u16,
    pub output_vlan_id: u16,
    pub output_vlan_type: OutputVlanType,
}

/// One compiled instruction for one switch, tagged by `command` on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "command")]
pub enum FlowSegment {
    #[serde(rename = "install_ingress_flow")]
    Ingress(IngressFlow),
    #[serde(rename = "install_transit_flow")]
    Transit(TransitFlow),
    #[serde(rename = "install_egress_flow")]
    Egress(EgressFlow),
}

impl FlowSegment {
    pub fn command(&self) -> FlowCommand {
        match self {
            FlowSegment::Ingress(_) => FlowCommand::Ingress,
            FlowSegment::Transit(_) => FlowCommand::Transit,
            FlowSegment::Egress(_) => FlowCommand::Egress,
        }
    }

    pub fn flow_name(&self) -> &str {
        match self {
            FlowSegment::Ingress(f) => &f.flow_name,
            FlowSegment::Transit(f) => &f.flow_name,
            FlowSegment::Egress(f) => &f.flow_name,
        }
    }

    pub fn switch_id(&self) -> &str {
        match self {
            FlowSegment::Ingress(f) => &f.switch_id,
            FlowSegment::Transit(f) => &f.switch_id,
            FlowSegment::Egress(f) => &f.switch_id,
        }
    }

    pub fn input_port(&self) -> u32 {
        match self {
            FlowSegment::Ingress(f) => f.input_port,
            FlowSegment::Transit(f) => f.input_port,
            FlowSegment::Egress(f) => f.input_port,
        }
    }

    pub fn output_port(&self) -> u32 {
        match self {
            FlowSegment::Ingress(f) => f.output_port,
            FlowSegment::Transit(f) => f.output_port,
            FlowSegment::Egress(f) => f.output_port,
        }
    }

    pub fn transit_vlan_id(&self) -> u16 {
        match self {
            FlowSegment::Ingress(f) => f.transit_vlan_id,
            FlowSegment::Transit(f) => f.transit_vlan_id,
            FlowSegment::Egress(f) => f.transit_vlan_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_wire_format() {
        let segment = FlowSegment::Transit(TransitFlow {
            destination: CONTROLLER.to_string(),
            flow_name: "f-1".to_string(),
            switch_id: "B".to_string(),
            input_port: 2,
            output_port: 3,
            transit_vlan_id: 150,
        });
        assert_eq!(
            serde_json::to_string(&segment).unwrap(),
            r#"{"command":"install_transit_flow","destination":"CONTROLLER","flow_name":"f-1","switch_id":"B","input_port":2,"output_port":3,"transit_vlan_id":150}"#
        );
    }

    #[test]
    fn test_egress_carries_output_vlan_type() {
        let segment = FlowSegment::Egress(EgressFlow {
            destination: CONTROLLER.to_string(),
            flow_name: "f-1".to_string(),
            switch_id: "C".to_string(),
            input_port: 4,
            output_port: 20,
            transit_vlan_id: 150,
            output_vlan_id: 200,
            output_vlan_type: OutputVlanType::Push,
        });
        let value = serde_json::to_value(&segment).unwrap();
        assert_eq!(value["command"], "install_egress_flow");
        assert_eq!(value["output_vlan_type"], "PUSH");

        let back: FlowSegment = serde_json::from_value(value).unwrap();
        assert_eq!(back.command(), FlowCommand::Egress);
        assert_eq!(back.switch_id(), "C");
    }

    #[test]
    fn test_command_names() {
        assert_eq!(FlowCommand::Ingress.as_ref(), "install_ingress_flow");
        assert_eq!(FlowCommand::Transit.to_string(), "install_transit_flow");
    }
}
