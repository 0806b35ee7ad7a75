use serde::{Deserialize, Serialize};

use crate::{FlowpathError, Result};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProvisionResult {
    Successful,
    Failed,
}

/// Outcome reported to the caller of a provisioning request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResponse {
    pub result: ProvisionResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProvisionResponse {
    pub fn successful(flow_id: impl Into<String>) -> Self {
        Self {
            result: ProvisionResult::Successful,
            flow_id: Some(flow_id.into()),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            result: ProvisionResult::Failed,
            flow_id: None,
            message: Some(message.into()),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.result == ProvisionResult::Successful
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(FlowpathError::from)
    }
}

impl From<&FlowpathError> for ProvisionResponse {
    fn from(err: &FlowpathError) -> Self {
        ProvisionResponse::failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_json() {
        let json = ProvisionResponse::successful("f-1").to_json().unwrap();
        assert_eq!(json, r#"{"result":"successful","flow_id":"f-1"}"#);
    }

    #[test]
    fn test_path_not_found_json() {
        let err = FlowpathError::PathNotFound {
            src: "A".to_string(),
            dst: "C".to_string(),
        };
        let json = ProvisionResponse::from(&err).to_json().unwrap();
        assert_eq!(json, r#"{"result":"failed","message":"unable to find valid path in the network"}"#);
    }
}
