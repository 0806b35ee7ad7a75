use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{FlowpathError, OutputVlanType, Result};

/// A port or vlan value as it arrives on the wire: either a JSON number or a numeric string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NumericField {
    Number(serde_json::Number),
    Text(String),
}

impl NumericField {
    /// Parses the field as a non-negative integer that fits in `T`.
    pub fn parse<T>(
        &self,
        name: &str,
    ) -> Result<T>
    where
        T: TryFrom<u64>,
    {
        let value = match self {
            NumericField::Number(n) => n.as_u64().ok_or_else(|| FlowpathError::MalformedInput(format!("{} must be a non-negative integer, got {}", name, n)))?,
            NumericField::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| FlowpathError::MalformedInput(format!("{} must be a non-negative integer, got '{}'", name, s)))?,
        };
        T::try_from(value).map_err(|_| FlowpathError::MalformedInput(format!("{} is out of range: {}", name, value)))
    }
}

impl From<u64> for NumericField {
    fn from(value: u64) -> Self {
        NumericField::Number(value.into())
    }
}

impl From<&str> for NumericField {
    fn from(value: &str) -> Self {
        NumericField::Text(value.to_string())
    }
}

/// Inbound provisioning request between two switch endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProvisionRequest {
    pub src_switch: String,
    pub src_port: NumericField,
    pub src_vlan: NumericField,
    pub dst_switch: String,
    pub dst_port: NumericField,
    pub dst_vlan: NumericField,
    /// Overrides the configured output vlan action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_vlan_type: Option<OutputVlanType>,
}

/// One side of a flow: the customer-facing switch, port and vlan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub switch_id: String,
    pub port: u32,
    pub vlan: u16,
}

/// A request whose numeric fields have all been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub src: Endpoint,
    pub dst: Endpoint,
    pub output_vlan_type: Option<OutputVlanType>,
}

impl ProvisionRequest {
    pub fn new(
        src: (&str, u32, u16),
        dst: (&str, u32, u16),
    ) -> Self {
        Self {
            src_switch: src.0.to_string(),
            src_port: u64::from(src.1).into(),
            src_vlan: u64::from(src.2).into(),
            dst_switch: dst.0.to_string(),
            dst_port: u64::from(dst.1).into(),
            dst_vlan: u64::from(dst.2).into(),
            output_vlan_type: None,
        }
    }

    pub fn with_output_vlan_type(
        mut self,
        output_vlan_type: OutputVlanType,
    ) -> Self {
        self.output_vlan_type = Some(output_vlan_type);
        self
    }

    /// JSON schema the raw request body must satisfy.
    pub fn schema() -> serde_json::Value {
        let numeric = json!({ "type": ["integer", "string"] });
        let switch = json!({ "type": "string", "minLength": 1 });
        json!({
            "type": "object",
            "required": ["src_switch", "src_port", "src_vlan", "dst_switch", "dst_port", "dst_vlan"],
            "properties": {
                "src_switch": switch,
                "src_port": numeric,
                "src_vlan": numeric,
                "dst_switch": switch,
                "dst_port": numeric,
                "dst_vlan": numeric,
                "output_vlan_type": { "enum": ["PUSH", "POP", "REPLACE", "NONE"] }
            }
        })
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(s).map_err(|e| FlowpathError::MalformedInput(e.to_string()))?;
        jsonschema::validate(&Self::schema(), &value)?;
        serde_json::from_value(value).map_err(|e| FlowpathError::MalformedInput(e.to_string()))
    }

    /// Checks every switch name and numeric field.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        if self.src_switch.is_empty() || self.dst_switch.is_empty() {
            return Err(FlowpathError::MalformedInput("switch names must not be empty".to_string()));
        }

        Ok(ValidatedRequest {
            src: Endpoint {
                switch_id: self.src_switch.clone(),
                port: self.src_port.parse("src_port")?,
                vlan: self.src_vlan.parse("src_vlan")?,
            },
            dst: Endpoint {
                switch_id: self.dst_switch.clone(),
                port: self.dst_port.parse("dst_port")?,
                vlan: self.dst_vlan.parse("dst_vlan")?,
            },
            output_vlan_type: self.output_vlan_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_accepts_numeric_strings() {
        let req = ProvisionRequest::from_json(
            r#"{"src_switch":"A","src_port":"10","src_vlan":100,"dst_switch":"C","dst_port":20,"dst_vlan":"200"}"#,
        )
        .unwrap();
        let validated = req.validate().unwrap();
        assert_eq!(validated.src.port, 10);
        assert_eq!(validated.src.vlan, 100);
        assert_eq!(validated.dst.port, 20);
        assert_eq!(validated.dst.vlan, 200);
        assert_eq!(validated.output_vlan_type, None);
    }

    #[test]
    fn test_from_json_reads_output_vlan_type() {
        let req = ProvisionRequest::from_json(
            r#"{"src_switch":"A","src_port":1,"src_vlan":1,"dst_switch":"B","dst_port":2,"dst_vlan":2,"output_vlan_type":"POP"}"#,
        )
        .unwrap();
        assert_eq!(req.output_vlan_type, Some(OutputVlanType::Pop));
    }

    #[test]
    fn test_from_json_rejects_missing_field() {
        let err = ProvisionRequest::from_json(r#"{"src_switch":"A","src_port":1,"src_vlan":1,"dst_switch":"B","dst_port":2}"#).unwrap_err();
        assert!(matches!(err, FlowpathError::MalformedInput(_)));
    }

    #[test]
    fn test_from_json_rejects_bad_types() {
        let err = ProvisionRequest::from_json(r#"{"src_switch":"A","src_port":[1],"src_vlan":1,"dst_switch":"B","dst_port":2,"dst_vlan":2}"#).unwrap_err();
        assert!(matches!(err, FlowpathError::MalformedInput(_)));
    }

    #[test]
    fn test_validate_rejects_non_numeric_port() {
        let mut req = ProvisionRequest::new(("A", 10, 100), ("C", 20, 200));
        req.src_port = "ten".into();
        assert!(matches!(req.validate(), Err(FlowpathError::MalformedInput(_))));
    }

    #[test]
    fn test_validate_rejects_negative_and_fractional() {
        let mut req = ProvisionRequest::new(("A", 10, 100), ("C", 20, 200));
        req.dst_port = NumericField::Number((-1i64).into());
        assert!(matches!(req.validate(), Err(FlowpathError::MalformedInput(_))));

        let mut req = ProvisionRequest::new(("A", 10, 100), ("C", 20, 200));
        req.dst_vlan = NumericField::Number(serde_json::Number::from_f64(1.5).unwrap());
        assert!(matches!(req.validate(), Err(FlowpathError::MalformedInput(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_vlan() {
        let mut req = ProvisionRequest::new(("A", 10, 100), ("C", 20, 200));
        req.src_vlan = 70000u64.into();
        assert!(matches!(req.validate(), Err(FlowpathError::MalformedInput(_))));
    }

    #[test]
    fn test_validate_rejects_empty_switch() {
        let req = ProvisionRequest::new(("", 10, 100), ("C", 20, 200));
        assert!(matches!(req.validate(), Err(FlowpathError::MalformedInput(_))));
    }
}
