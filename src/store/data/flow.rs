use serde::{Deserialize, Serialize};

use crate::store::{DbCollectionIden, StoreIden};

/// Persisted flow relationship between two switches, one per direction.
#[derive(Default, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Flow {
    pub id: String,
    pub flow_id: String,
    pub src_switch: String,
    pub src_port: i64,
    pub dst_switch: String,
    pub dst_port: i64,
    /// Transit vlan carried by this direction's segments.
    pub transit_vlan_id: i64,
    pub timestamp: i64,
}

impl DbCollectionIden for Flow {
    fn iden() -> StoreIden {
        StoreIden::Flows
    }
}
