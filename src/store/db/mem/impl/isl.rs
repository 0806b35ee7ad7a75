use std::collections::HashMap;

use serde_json::{Value as JsonValue, json};

use crate::{
    Result,
    store::{data::Isl, db::mem::DbDocument},
};

impl DbDocument for Isl {
    fn id(&self) -> &str {
        &self.id
    }

    fn doc(&self) -> Result<HashMap<String, JsonValue>> {
        let mut map = HashMap::new();
        map.insert("id".to_string(), json!(self.id.clone()));
        map.insert("src_switch".to_string(), json!(self.src_switch.clone()));
        map.insert("src_port".to_string(), json!(self.src_port));
        map.insert("dst_switch".to_string(), json!(self.dst_switch.clone()));
        map.insert("dst_port".to_string(), json!(self.dst_port));
        map.insert("state".to_string(), json!(self.state.clone()));
        map.insert("timestamp".to_string(), json!(self.timestamp));
        Ok(map)
    }
}
