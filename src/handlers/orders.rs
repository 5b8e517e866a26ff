use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::extract::WithRejection;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::{JsonBody, PathParam};
use crate::{
    commands::{orders, summary},
    database::Database,
    error::{AppError, AppResult},
    models::{NewOrder, NewOrderLine, Order, OrderLine, OrderStatus, OrderSummary},
};

// Fields are optional so a missing one becomes a 400 with a JSON reason
// instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    agent_id: Option<i32>,
    shop_id: Option<i32>,
    sales_rep_id: Option<i32>,
    payment_method: Option<String>,
    payment_amount: Option<Decimal>,
    product_ids: Option<Vec<i32>>,
    quantities: Option<Vec<i32>>,
    prices: Option<Vec<Decimal>>,
    order_status: Option<String>,
}

impl PlaceOrderRequest {
    pub fn into_new_order(self) -> AppResult<NewOrder> {
        let (
            Some(agent_id),
            Some(shop_id),
            Some(sales_rep_id),
            Some(payment_method),
            Some(payment_amount),
            Some(product_ids),
            Some(quantities),
            Some(prices),
        ) = (
            self.agent_id,
            self.shop_id,
            self.sales_rep_id,
            self.payment_method,
            self.payment_amount,
            self.product_ids,
            self.quantities,
            self.prices,
        )
        else {
            return Err(AppError::invalid("Missing required fields"));
        };

        if product_ids.len() != quantities.len() || product_ids.len() != prices.len() {
            return Err(AppError::invalid(
                "Product IDs, quantities, and prices arrays must have the same length",
            ));
        }

        let payment_method = payment_method.parse().map_err(AppError::InvalidArgument)?;
        let status = match self.order_status.as_deref() {
            Some(s) if !s.trim().is_empty() => s.parse().map_err(AppError::InvalidArgument)?,
            _ => OrderStatus::default(),
        };

        let lines = product_ids
            .into_iter()
            .zip(quantities)
            .zip(prices)
            .map(|((product_id, quantity), price)| NewOrderLine { product_id, quantity, price })
            .collect();

        Ok(NewOrder {
            agent_id,
            shop_id,
            sales_rep_id,
            payment_method,
            payment_amount,
            status,
            lines,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    status: Option<String>,
}

pub async fn place_order(
    State(db): State<Database>,
    WithRejection(Json(request), _): JsonBody<PlaceOrderRequest>,
) -> AppResult<impl IntoResponse> {
    let order = request.into_new_order()?;
    let order_id = orders::place_order(&db, &order).await?;
    Ok((StatusCode::CREATED, Json(json!({ "orderId": order_id }))))
}

pub async fn order_summaries(State(db): State<Database>) -> AppResult<Json<Vec<OrderSummary>>> {
    Ok(Json(summary::order_summaries(&db).await?))
}

pub async fn orders_for_agent(
    State(db): State<Database>,
    WithRejection(Path(agent_id), _): PathParam<i32>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(orders::orders_for_agent(&db, agent_id).await?))
}

pub async fn orders_for_sales_rep(
    State(db): State<Database>,
    WithRejection(Path(sales_rep_id), _): PathParam<i32>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(orders::orders_for_sales_rep(&db, sales_rep_id).await?))
}

pub async fn order_items(
    State(db): State<Database>,
    WithRejection(Path(order_id), _): PathParam<i32>,
) -> AppResult<Json<Vec<OrderLine>>> {
    Ok(Json(orders::order_lines(&db, order_id).await?))
}

pub async fn update_status(
    State(db): State<Database>,
    WithRejection(Path(order_id), _): PathParam<i32>,
    WithRejection(Json(update), _): JsonBody<StatusUpdate>,
) -> AppResult<Json<Order>> {
    let status: OrderStatus = match update.status.as_deref() {
        Some(s) if !s.trim().is_empty() => s.parse().map_err(AppError::InvalidArgument)?,
        _ => return Err(AppError::invalid("Status is required")),
    };

    Ok(Json(orders::update_status(&db, order_id, status).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;

    fn request() -> PlaceOrderRequest {
        serde_json::from_value(json!({
            "agentId": 1,
            "shopId": 2,
            "salesRepId": 3,
            "paymentMethod": "Credit Card",
            "paymentAmount": 152.50,
            "productIds": [5],
            "quantities": [10],
            "prices": [15.25]
        }))
        .unwrap()
    }

    #[test]
    fn request_becomes_an_order() {
        let order = request().into_new_order().unwrap();

        assert_eq!(order.agent_id, 1);
        assert_eq!(order.payment_method, PaymentMethod::CreditCard);
        assert_eq!(order.payment_amount, Decimal::new(15250, 2));
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(
            order.lines,
            vec![NewOrderLine { product_id: 5, quantity: 10, price: Decimal::new(1525, 2) }]
        );
    }

    #[test]
    fn status_override_is_honoured() {
        let mut req = request();
        req.order_status = Some("Shipped".to_string());
        assert_eq!(req.into_new_order().unwrap().status, OrderStatus::Shipped);
    }

    #[test]
    fn missing_fields_are_reported() {
        let mut req = request();
        req.shop_id = None;
        let err = req.into_new_order().unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields");
    }

    #[test]
    fn zero_payment_amount_is_accepted() {
        let mut req = request();
        req.payment_amount = Some(Decimal::ZERO);
        assert_eq!(req.into_new_order().unwrap().payment_amount, Decimal::ZERO);
    }

    #[test]
    fn parallel_arrays_must_line_up() {
        let mut req = request();
        req.prices = Some(vec![]);
        assert!(matches!(req.into_new_order(), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn unknown_payment_method_is_invalid() {
        let mut req = request();
        req.payment_method = Some("Barter".to_string());
        assert!(matches!(req.into_new_order(), Err(AppError::InvalidArgument(_))));
    }
}
