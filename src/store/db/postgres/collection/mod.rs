mod event;
mod flow;
mod isl;
mod switch;

use std::sync::Arc;

use sea_query::{Alias as SeaAlias, Condition, Expr as SeaExpr, SimpleExpr};
use serde_json::Value as JsonValue;

use crate::store::query::Query;

use super::synclient::SynClient;

pub use event::EventCollection;
pub use flow::FlowCollection;
pub use isl::IslCollection;
pub use switch::SwitchCollection;

use crate::store::map_db_err;

pub type DbConnection = Arc<SynClient>;

/// Turns the equality filters of a query into a sea-query condition.
pub fn into_query(q: &Query) -> Condition {
    q.filter().iter().fold(Condition::all(), |cond, (field, value)| {
        let col = SeaExpr::col(SeaAlias::new(field));
        let expr: SimpleExpr = match value {
            JsonValue::String(s) => col.eq(s.clone()),
            JsonValue::Bool(b) => col.eq(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => col.eq(i),
                None => col.eq(n.as_f64().unwrap_or_default()),
            },
            JsonValue::Null => col.is_null(),
            other => col.eq(other.to_string()),
        };
        cond.add(expr)
    })
}
