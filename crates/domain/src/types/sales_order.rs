use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sales order header as returned by `/salesOrders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderHeader {
    pub id: Uuid,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_document_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posting_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub customer_number: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_to_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_to_customer_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_to_customer_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_to_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_to_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_to_address_line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_to_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_to_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_to_post_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub prices_include_tax: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesperson: Option<String>,
    #[serde(default)]
    pub partial_shipping: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub discount_applied_before_tax: bool,
    #[serde(default)]
    pub total_amount_excluding_tax: f64,
    #[serde(default)]
    pub total_tax_amount: f64,
    #[serde(default)]
    pub total_amount_including_tax: f64,
    #[serde(default)]
    pub fully_shipped: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date_time: Option<DateTime<Utc>>,
}

/// Line on a sales order, from `/salesOrders(<id>)/salesOrderLines`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderLine {
    pub id: String,
    pub document_id: Uuid,
    #[serde(default)]
    pub sequence: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
    #[serde(default)]
    pub line_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_object_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measure_code: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub discount_applied_before_tax: bool,
    #[serde(default)]
    pub amount_excluding_tax: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_code: Option<String>,
    #[serde(default)]
    pub tax_percent: f64,
    #[serde(default)]
    pub total_tax_amount: f64,
    #[serde(default)]
    pub amount_including_tax: f64,
    #[serde(default)]
    pub invoice_discount_allocation: f64,
    #[serde(default)]
    pub net_amount: f64,
    #[serde(default)]
    pub net_tax_amount: f64,
    #[serde(default)]
    pub net_amount_including_tax: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_date: Option<NaiveDate>,
    #[serde(default)]
    pub shipped_quantity: f64,
    #[serde(default)]
    pub invoiced_quantity: f64,
    #[serde(default)]
    pub invoice_quantity: f64,
    #[serde(default)]
    pub ship_quantity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_order_header_dates() {
        let order: SalesOrderHeader = serde_json::from_value(serde_json::json!({
            "id": "aaaaaaaa-bbbb-4ccc-8ddd-eeeeeeeeeeee",
            "number": "S-ORD101001",
            "orderDate": "2024-01-15",
            "customerNumber": "10000",
            "customerName": "Adatum Corporation",
            "totalAmountIncludingTax": 1500.0,
            "status": "Open"
        }))
        .unwrap();

        assert_eq!(order.order_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(order.status, "Open");
        assert!(!order.fully_shipped);
    }

    #[test]
    fn parses_line_with_composite_id() {
        let line: SalesOrderLine = serde_json::from_value(serde_json::json!({
            "id": "aaaaaaaa-bbbb-4ccc-8ddd-eeeeeeeeeeee-10000",
            "documentId": "aaaaaaaa-bbbb-4ccc-8ddd-eeeeeeeeeeee",
            "sequence": 10000,
            "lineType": "Item",
            "lineObjectNumber": "1896-S",
            "quantity": 2.0,
            "unitPrice": 649.4
        }))
        .unwrap();

        assert_eq!(line.sequence, 10000);
        assert_eq!(line.line_object_number.as_deref(), Some("1896-S"));
    }
}
