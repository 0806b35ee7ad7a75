//! Transport envelope for compiled segments.

use serde::{Deserialize, Serialize};

use crate::{FlowpathError, Result, compiler::FlowSegment, utils};

/// Envelope published on the message bus, tagged by `type`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "COMMAND")]
    Command(CommandMessage),
}

impl Message {
    pub fn command() -> CommandMessageBuilder {
        CommandMessageBuilder::default()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(FlowpathError::from)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(FlowpathError::from)
    }
}

/// A single segment addressed to a switch. Immutable once built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    timestamp: i64,
    correlation_id: String,
    data: FlowSegment,
}

impl CommandMessage {
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn data(&self) -> &FlowSegment {
        &self.data
    }

    pub fn into_data(self) -> FlowSegment {
        self.data
    }
}

/// Builds a [`Message::Command`], checking every field before the message exists.
#[derive(Debug, Default)]
pub struct CommandMessageBuilder {
    timestamp: Option<i64>,
    correlation_id: Option<String>,
    data: Option<FlowSegment>,
}

impl CommandMessageBuilder {
    /// Defaults to the current time in milliseconds.
    pub fn timestamp(
        mut self,
        timestamp: i64,
    ) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Defaults to the segment's flow name.
    pub fn correlation_id(
        mut self,
        correlation_id: impl Into<String>,
    ) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn data(
        mut self,
        data: FlowSegment,
    ) -> Self {
        self.data = Some(data);
        self
    }

    pub fn build(self) -> Result<Message> {
        let data = self.data.ok_or_else(|| FlowpathError::MalformedInput("command message requires a segment".to_string()))?;
        if data.flow_name().is_empty() {
            return Err(FlowpathError::MalformedInput("command segment has no flow name".to_string()));
        }
        if data.switch_id().is_empty() {
            return Err(FlowpathError::MalformedInput("command segment has no switch id".to_string()));
        }

        let timestamp = self.timestamp.unwrap_or_else(utils::time::time_millis);
        if timestamp < 0 {
            return Err(FlowpathError::MalformedInput(format!("command timestamp is negative: {}", timestamp)));
        }

        let correlation_id = self.correlation_id.unwrap_or_else(|| data.flow_name().to_string());
        if correlation_id.is_empty() {
            return Err(FlowpathError::MalformedInput("command correlation id is empty".to_string()));
        }

        Ok(Message::Command(CommandMessage {
            timestamp,
            correlation_id,
            data,
        }))
    }
}
