use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    PayPal,
    Check,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::Check => "Check",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Credit Card" => Ok(PaymentMethod::CreditCard),
            "Bank Transfer" => Ok(PaymentMethod::BankTransfer),
            "PayPal" => Ok(PaymentMethod::PayPal),
            "Check" => Ok(PaymentMethod::Check),
            other => Err(format!("Unknown payment method: {}", other)),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Processing" => Ok(OrderStatus::Processing),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub order_id: i32,
    pub agent_id: i32,
    pub shop_id: i32,
    pub sales_rep_id: i32,
    pub payment_id: i32,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct OrderLine {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
    pub order_date: DateTime<Utc>,
    pub product_name: String,
}

/// One denormalized row per order, as consumed by the dashboards.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct OrderSummary {
    pub order_id: i32,
    pub agent_id: i32,
    pub sales_rep_id: i32,
    #[serde(rename = "AgentName")]
    pub agent_name: String,
    #[serde(rename = "ShopName")]
    pub shop_name: String,
    #[serde(rename = "SalesRepName")]
    pub sales_rep_name: String,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,
    #[serde(rename = "PaymentAmount")]
    pub payment_amount: Decimal,
    pub status: String,
    #[serde(rename = "TotalItems")]
    pub total_items: i64,
    #[serde(rename = "TotalQuantity")]
    pub total_quantity: i64,
    #[serde(rename = "TotalOrderValue")]
    pub total_order_value: Decimal,
    #[serde(rename = "OrderDate")]
    pub order_date: DateTime<Utc>,
}

/// A cart line as submitted by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub agent_id: i32,
    pub shop_id: i32,
    pub sales_rep_id: i32,
    pub payment_method: PaymentMethod,
    pub payment_amount: Decimal,
    pub status: OrderStatus,
    pub lines: Vec<NewOrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_methods_use_display_names() {
        assert_eq!("Bank Transfer".parse::<PaymentMethod>(), Ok(PaymentMethod::BankTransfer));
        assert_eq!(PaymentMethod::CreditCard.as_str(), "Credit Card");
        assert!("Cash".parse::<PaymentMethod>().is_err());
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"Credit Card\""
        );
    }

    #[test]
    fn order_status_defaults_to_processing() {
        assert_eq!(OrderStatus::default(), OrderStatus::Processing);
        assert_eq!("Shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
        assert!("Lost".parse::<OrderStatus>().is_err());
    }
}
