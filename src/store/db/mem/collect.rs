use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{Arc, RwLock},
};

use serde_json::Value as JsonValue;
use tracing::trace;

use crate::{
    FlowpathError, Result, ShareLock,
    store::{DbCollection, PageData, query::Query},
};

use super::DbDocument;

/// In-memory collection keyed by record id.
pub struct Collect<T> {
    name: String,
    items: ShareLock<BTreeMap<String, T>>,
}

impl<T> fmt::Debug for Collect<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Collect").field("name", &self.name).finish()
    }
}

impl<T> Collect<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    fn poisoned(&self) -> FlowpathError {
        FlowpathError::Store(format!("collection {} lock poisoned", self.name))
    }
}

impl<T> DbCollection for Collect<T>
where
    T: DbDocument + Clone + Send + Sync,
{
    type Item = T;

    fn exists(
        &self,
        id: &str,
    ) -> Result<bool> {
        let items = self.items.read().map_err(|_| self.poisoned())?;
        Ok(items.contains_key(id))
    }

    fn find(
        &self,
        id: &str,
    ) -> Result<Self::Item> {
        trace!("mem::{}::find({})", self.name, id);
        let items = self.items.read().map_err(|_| self.poisoned())?;
        items.get(id).cloned().ok_or_else(|| FlowpathError::Store(format!("{} {} not found", self.name, id)))
    }

    fn query(
        &self,
        q: &Query,
    ) -> Result<PageData<Self::Item>> {
        let items = self.items.read().map_err(|_| self.poisoned())?;

        let mut matched: Vec<(HashMap<String, JsonValue>, T)> = Vec::new();
        for item in items.values() {
            let doc = item.doc()?;
            if q.filter().iter().all(|(field, value)| doc.get(field) == Some(value)) {
                matched.push((doc, item.clone()));
            }
        }

        for (field, rev) in q.order_by().iter().rev() {
            matched.sort_by(|(a, _), (b, _)| {
                let ord = compare(a.get(field), b.get(field));
                if *rev { ord.reverse() } else { ord }
            });
        }

        let count = matched.len();
        let rows = matched.into_iter().skip(q.offset()).take(q.limit()).map(|(_, item)| item).collect::<Vec<_>>();

        Ok(PageData {
            count,
            page_num: q.offset() / q.limit() + 1,
            page_count: count.div_ceil(q.limit()),
            page_size: q.limit(),
            rows,
        })
    }

    fn create(
        &self,
        data: &Self::Item,
    ) -> Result<bool> {
        trace!("mem::{}::create({})", self.name, data.id());
        let mut items = self.items.write().map_err(|_| self.poisoned())?;
        if items.contains_key(data.id()) {
            return Err(FlowpathError::Store(format!("{} {} already exists", self.name, data.id())));
        }
        items.insert(data.id().to_string(), data.clone());
        Ok(true)
    }

    fn update(
        &self,
        data: &Self::Item,
    ) -> Result<bool> {
        let mut items = self.items.write().map_err(|_| self.poisoned())?;
        match items.get_mut(data.id()) {
            Some(item) => {
                *item = data.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(
        &self,
        id: &str,
    ) -> Result<bool> {
        let mut items = self.items.write().map_err(|_| self.poisoned())?;
        Ok(items.remove(id).is_some())
    }
}

fn compare(
    a: Option<&JsonValue>,
    b: Option<&JsonValue>,
) -> Ordering {
    match (a, b) {
        (Some(JsonValue::Number(a)), Some(JsonValue::Number(b))) => a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(Ordering::Equal),
        (Some(JsonValue::String(a)), Some(JsonValue::String(b))) => a.cmp(b),
        (Some(JsonValue::Bool(a)), Some(JsonValue::Bool(b))) => a.cmp(b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
