use serde::{Deserialize, Serialize};

use crate::{
    store::{DbCollectionIden, StoreIden},
    topology::LinkState,
    utils,
};

#[derive(Default, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Switch {
    /// switch name, also its key
    pub id: String,
    pub state: String,
    pub timestamp: i64,
}

impl Switch {
    pub fn new(
        id: impl Into<String>,
        state: LinkState,
    ) -> Self {
        Self {
            id: id.into(),
            state: state.as_ref().to_string(),
            timestamp: utils::time::time_millis(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == LinkState::Active.as_ref()
    }
}

impl DbCollectionIden for Switch {
    fn iden() -> StoreIden {
        StoreIden::Switches
    }
}
