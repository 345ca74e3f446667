use serde::{Deserialize, Serialize};

/// Collection envelope returned by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ODataCollection<T> {
    #[serde(rename = "@odata.context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub value: Vec<T>,
}

impl<T> ODataCollection<T> {
    pub fn into_values(self) -> Vec<T> {
        self.value
    }
}

/// Escape a string literal for use inside single quotes in a `$filter`.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// `<field> eq '<value>'` with the value escaped.
pub fn eq_filter(field: &str, value: &str) -> String {
    format!("{field} eq '{}'", escape_literal(value))
}

/// Join clauses with ` and `. Returns `None` when there is nothing to join.
pub fn join_filters<I>(clauses: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let clauses: Vec<String> = clauses.into_iter().collect();
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" and "))
    }
}
