use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::{
    commands::inventory,
    database::Database,
    error::{AppError, AppResult},
    models::{NewOrder, NewOrderLine, Order, OrderLine, OrderStatus},
};

/// Rejects carts that could never be placed, before anything is written.
pub fn validate_order(order: &NewOrder) -> AppResult<()> {
    if order.lines.is_empty() {
        return Err(AppError::invalid("An order needs at least one product"));
    }

    if order.payment_amount < Decimal::ZERO {
        return Err(AppError::invalid("Payment amount cannot be negative"));
    }

    let mut seen = HashSet::new();
    for line in &order.lines {
        if line.quantity <= 0 {
            return Err(AppError::invalid(format!(
                "Quantity for product ID {} must be positive",
                line.product_id
            )));
        }
        if line.price < Decimal::ZERO {
            return Err(AppError::invalid(format!(
                "Price for product ID {} cannot be negative",
                line.product_id
            )));
        }
        if !seen.insert(line.product_id) {
            return Err(AppError::invalid(format!(
                "Product ID {} appears more than once in the order",
                line.product_id
            )));
        }
    }

    if order_total(&order.lines).is_none() {
        return Err(AppError::invalid("Order total is out of range"));
    }

    Ok(())
}

/// Σ(quantity × price) over the cart, or `None` if it does not fit in a
/// `Decimal`.
pub fn order_total(lines: &[NewOrderLine]) -> Option<Decimal> {
    lines.iter().try_fold(Decimal::ZERO, |total, line| {
        Decimal::from(line.quantity)
            .checked_mul(line.price)
            .and_then(|value| total.checked_add(value))
    })
}

/// Checks every line against locked on-hand quantities, in cart order.
pub fn check_availability(lines: &[NewOrderLine], on_hand: &HashMap<i32, i32>) -> AppResult<()> {
    for line in lines {
        let available = on_hand.get(&line.product_id).copied().unwrap_or(0);
        if available < line.quantity {
            return Err(AppError::InsufficientInventory {
                product_id: line.product_id,
                available,
                requested: line.quantity,
            });
        }
    }
    Ok(())
}

/// Places an order: payment, order, order lines and inventory decrements are
/// written in one transaction. Returns the new order id.
///
/// Any error drops the transaction before commit, which rolls back every write
/// made here.
pub async fn place_order(db: &Database, order: &NewOrder) -> AppResult<i32> {
    validate_order(order)?;

    // The client computes the payment amount; a mismatch is accepted as-is.
    if let Some(total) = order_total(&order.lines).filter(|t| *t != order.payment_amount) {
        log::warn!(
            "Payment amount {} for agent {} differs from line total {}",
            order.payment_amount,
            order.agent_id,
            total
        );
    }

    let mut tx = db.begin().await?;

    let product_ids: Vec<i32> = order.lines.iter().map(|line| line.product_id).collect();
    let on_hand = inventory::lock_for_order(&mut tx, order.agent_id, &product_ids).await?;
    check_availability(&order.lines, &on_hand)?;

    let payment_id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO payments (method, amount, payment_date)
        VALUES ($1, $2, NOW())
        RETURNING payment_id
        "#,
    )
    .bind(order.payment_method.as_str())
    .bind(order.payment_amount)
    .fetch_one(&mut *tx)
    .await?;

    let order_id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO orders (agent_id, shop_id, sales_rep_id, payment_id, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING order_id
        "#,
    )
    .bind(order.agent_id)
    .bind(order.shop_id)
    .bind(order.sales_rep_id)
    .bind(payment_id)
    .bind(order.status.as_str())
    .fetch_one(&mut *tx)
    .await?;

    for line in &order.lines {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price, order_date)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.price)
        .execute(&mut *tx)
        .await?;

        inventory::reserve_and_decrement(&mut tx, order.agent_id, line.product_id, line.quantity)
            .await?;
    }

    tx.commit().await?;

    log::info!(
        "Order {} placed by agent {} for shop {} ({} lines)",
        order_id,
        order.agent_id,
        order.shop_id,
        order.lines.len()
    );
    Ok(order_id)
}

pub async fn update_status(db: &Database, order_id: i32, status: OrderStatus) -> AppResult<Order> {
    sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders SET status = $2
        WHERE order_id = $1
        RETURNING order_id, agent_id, shop_id, sales_rep_id, payment_id, status
        "#,
    )
    .bind(order_id)
    .bind(status.as_str())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Order not found"))
}

pub async fn orders_for_agent(db: &Database, agent_id: i32) -> AppResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE agent_id = $1 ORDER BY order_id",
    )
    .bind(agent_id)
    .fetch_all(db)
    .await?;
    Ok(orders)
}

pub async fn orders_for_sales_rep(db: &Database, sales_rep_id: i32) -> AppResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE sales_rep_id = $1 ORDER BY order_id",
    )
    .bind(sales_rep_id)
    .fetch_all(db)
    .await?;
    Ok(orders)
}

pub async fn order_lines(db: &Database, order_id: i32) -> AppResult<Vec<OrderLine>> {
    let lines = sqlx::query_as::<_, OrderLine>(
        r#"
        SELECT oi.order_id, oi.product_id, oi.quantity, oi.price, oi.order_date,
               p.name AS product_name
        FROM order_items oi
        JOIN products p ON oi.product_id = p.product_id
        WHERE oi.order_id = $1
        ORDER BY oi.product_id
        "#,
    )
    .bind(order_id)
    .fetch_all(db)
    .await?;
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use rust_decimal::Decimal;

    fn line(product_id: i32, quantity: i32, price: Decimal) -> NewOrderLine {
        NewOrderLine { product_id, quantity, price }
    }

    fn order_with(lines: Vec<NewOrderLine>) -> NewOrder {
        NewOrder {
            agent_id: 1,
            shop_id: 1,
            sales_rep_id: 1,
            payment_method: PaymentMethod::CreditCard,
            payment_amount: order_total(&lines).unwrap_or_default(),
            status: OrderStatus::Processing,
            lines,
        }
    }

    #[test]
    fn empty_cart_is_rejected() {
        let err = validate_order(&order_with(vec![])).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let err = validate_order(&order_with(vec![line(5, 0, Decimal::new(1525, 2))])).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = validate_order(&order_with(vec![line(5, 1, Decimal::new(-1, 0))])).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn repeated_product_is_rejected() {
        let order = order_with(vec![
            line(5, 1, Decimal::new(1525, 2)),
            line(5, 2, Decimal::new(1525, 2)),
        ]);
        assert!(matches!(validate_order(&order), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn payment_amount_mismatch_is_not_enforced() {
        let mut order = order_with(vec![line(5, 10, Decimal::new(1525, 2))]);
        order.payment_amount = Decimal::new(1, 0);
        assert!(validate_order(&order).is_ok());
    }

    #[test]
    fn total_multiplies_quantity_by_price() {
        let lines = vec![line(5, 10, Decimal::new(1525, 2)), line(6, 3, Decimal::new(200, 2))];
        assert_eq!(order_total(&lines), Some(Decimal::new(15850, 2)));
    }

    #[test]
    fn overflowing_total_is_rejected_before_any_write() {
        assert_eq!(order_total(&[line(5, 1_000_000, Decimal::MAX)]), None);
        assert_eq!(order_total(&[line(5, 1, Decimal::MAX), line(6, 1, Decimal::MAX)]), None);

        let order = order_with(vec![line(5, 1_000_000, Decimal::MAX)]);
        match validate_order(&order) {
            Err(AppError::InvalidArgument(msg)) => assert_eq!(msg, "Order total is out of range"),
            other => panic!("expected invalid argument, got {:?}", other),
        }
    }

    #[test]
    fn availability_names_the_short_product() {
        let on_hand = HashMap::from([(5, 85), (6, 3)]);
        let lines = vec![line(5, 10, Decimal::ONE), line(6, 4, Decimal::ONE)];

        match check_availability(&lines, &on_hand) {
            Err(AppError::InsufficientInventory { product_id, available, requested }) => {
                assert_eq!((product_id, available, requested), (6, 3, 4));
            }
            other => panic!("expected insufficient inventory, got {:?}", other),
        }
    }

    #[test]
    fn missing_record_counts_as_empty_stock() {
        let on_hand = HashMap::from([(5, 85)]);
        let lines = vec![line(9, 1, Decimal::ONE)];

        assert!(matches!(
            check_availability(&lines, &on_hand),
            Err(AppError::InsufficientInventory { product_id: 9, available: 0, requested: 1 })
        ));
    }

    #[test]
    fn exact_stock_is_enough() {
        let on_hand = HashMap::from([(5, 85)]);
        assert!(check_availability(&[line(5, 85, Decimal::ONE)], &on_hand).is_ok());
    }
}
