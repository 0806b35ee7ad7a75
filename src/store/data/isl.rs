use serde::{Deserialize, Serialize};

use crate::{
    store::{DbCollectionIden, StoreIden},
    topology::LinkState,
    utils,
};

/// Directed inter-switch link.
#[derive(Default, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Isl {
    pub id: String,
    pub src_switch: String,
    pub src_port: i64,
    pub dst_switch: String,
    pub dst_port: i64,
    pub state: String,
    pub timestamp: i64,
}

impl Isl {
    /// Builds a link keyed by its two `switch_port` endpoints.
    pub fn new(
        src_switch: impl Into<String>,
        src_port: i64,
        dst_switch: impl Into<String>,
        dst_port: i64,
        state: LinkState,
    ) -> Self {
        let src_switch = src_switch.into();
        let dst_switch = dst_switch.into();
        Self {
            id: format!("{}_{}-{}_{}", src_switch, src_port, dst_switch, dst_port),
            src_switch,
            src_port,
            dst_switch,
            dst_port,
            state: state.as_ref().to_string(),
            timestamp: utils::time::time_millis(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == LinkState::Active.as_ref()
    }
}

impl DbCollectionIden for Isl {
    fn iden() -> StoreIden {
        StoreIden::Isls
    }
}
