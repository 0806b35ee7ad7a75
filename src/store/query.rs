//! Backend-neutral query description: equality filters, ordering and paging.

use serde_json::Value as JsonValue;

/// Default page size.
const DEFAULT_LIMIT: usize = 100;
/// Page size used when every matching record is wanted.
const UNBOUNDED_LIMIT: usize = u32::MAX as usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    filter: Vec<(String, JsonValue)>,
    order_by: Vec<(String, bool)>,
    limit: usize,
    offset: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    pub fn new() -> Self {
        Self {
            filter: Vec::new(),
            order_by: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// A query without a page size bound.
    pub fn all() -> Self {
        Self::new().set_limit(UNBOUNDED_LIMIT)
    }

    /// Adds an equality condition; all conditions must hold.
    pub fn eq(
        mut self,
        field: &str,
        value: impl Into<JsonValue>,
    ) -> Self {
        self.filter.push((field.to_string(), value.into()));
        self
    }

    /// Orders by `field`, descending when `rev` is true.
    pub fn push_order(
        mut self,
        field: &str,
        rev: bool,
    ) -> Self {
        self.order_by.push((field.to_string(), rev));
        self
    }

    pub fn set_limit(
        mut self,
        limit: usize,
    ) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn set_offset(
        mut self,
        offset: usize,
    ) -> Self {
        self.offset = offset;
        self
    }

    pub fn filter(&self) -> &[(String, JsonValue)] {
        &self.filter
    }

    pub fn order_by(&self) -> &[(String, bool)] {
        &self.order_by
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}
