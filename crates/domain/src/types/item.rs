use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inventory item as returned by `/items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub number: String,
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_category_code: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtin: Option<String>,
    #[serde(default)]
    pub inventory: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub price_includes_tax: bool,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_group_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_unit_of_measure_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let item: Item = serde_json::from_value(serde_json::json!({
            "id": "11111111-2222-4333-8444-555555555555",
            "number": "1896-S",
            "displayName": "ATHENS Desk",
            "type": "Inventory",
            "itemCategoryCode": "TABLE"
        }))
        .unwrap();

        assert_eq!(item.item_type, "Inventory");
        assert_eq!(item.item_category_code.as_deref(), Some("TABLE"));
        assert_eq!(item.inventory, 0.0);
        assert!(!item.blocked);
    }
}
