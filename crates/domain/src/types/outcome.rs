use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of posting a sales order. Upstream rejections are reported here
/// rather than as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipAndInvoiceOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ShipAndInvoiceOutcome {
    pub fn shipped(order_id: &str, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: format!("Sales order {order_id} shipped and invoiced successfully"),
            data,
        }
    }

    pub fn rejected(status: u16, body: &str) -> Self {
        Self { success: false, message: format!("Error {status}: {body}"), data: None }
    }
}
