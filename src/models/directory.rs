use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Agent {
    pub agent_id: i32,
    pub name: String,
    pub phone_no: Option<String>,
    pub location: Option<String>,
}

// Lightweight listing used by dropdowns
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AgentRef {
    pub agent_id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct SalesRep {
    pub sales_rep_id: i32,
    pub name: String,
    pub territory: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct SalesRepRef {
    pub sales_rep_id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub supplier_id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Shop {
    pub shop_id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub sales_rep_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ShopWithRep {
    pub shop_id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub sales_rep_id: Option<i32>,
    pub sales_rep_name: Option<String>,
}
