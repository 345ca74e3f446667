use serde::{Deserialize, Serialize};

/// `$top` used when a list call does not specify a limit.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Parameters shared by the list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Raw OData `$filter` expression
    pub filter: Option<String>,
    /// `$top`; defaults to [`DEFAULT_LIST_LIMIT`]
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderCreateRequest {
    pub customer_number: String,
}

/// Body for adding a line. Only item lines are created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderLineCreateRequest {
    pub line_type: String,
    pub line_object_number: String,
    pub quantity: f64,
}

impl SalesOrderLineCreateRequest {
    pub fn item(line_object_number: impl Into<String>, quantity: f64) -> Self {
        Self { line_type: "Item".to_string(), line_object_number: line_object_number.into(), quantity }
    }
}
