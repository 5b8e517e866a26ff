use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

/// One ledger row: how many units of a product an agent holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InventoryRecord {
    pub agent_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub last_update_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct InventoryView {
    pub agent_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub last_update_date: DateTime<Utc>,
    pub product_name: String,
    pub agent_name: String,
    pub supplier_name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct LowInventoryRow {
    pub product_id: i32,
    pub agent_id: i32,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    pub quantity: i32,
    #[serde(rename = "AgentName")]
    pub agent_name: String,
    #[serde(rename = "SupplierName")]
    pub supplier_name: String,
}
