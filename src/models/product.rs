use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub product_id: i32,
    pub supplier_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ProductWithSupplier {
    pub product_id: i32,
    pub supplier_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub supplier_name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PriceHistoryEntry {
    pub history_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub change_date: DateTime<Utc>,
}
