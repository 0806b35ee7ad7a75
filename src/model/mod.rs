mod request;
mod response;

use serde::{Deserialize, Serialize};

pub use request::{Endpoint, NumericField, ProvisionRequest, ValidatedRequest};
pub use response::{ProvisionResponse, ProvisionResult};

/// What the egress switch does with the customer vlan tag.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputVlanType {
    #[default]
    Push,
    Pop,
    Replace,
    None,
}
