use crate::{database::Database, error::AppResult, models::OrderSummary};

/// One row per order with its agent, shop, sales rep, payment and line
/// aggregates. The inner join on order lines drops orders that have none.
pub async fn order_summaries(db: &Database) -> AppResult<Vec<OrderSummary>> {
    let summaries = sqlx::query_as::<_, OrderSummary>(
        r#"
        SELECT o.order_id, o.agent_id, o.sales_rep_id,
               a.name AS agent_name, s.name AS shop_name, sr.name AS sales_rep_name,
               p.method AS payment_method, p.amount AS payment_amount, o.status,
               COUNT(DISTINCT oi.product_id) AS total_items,
               SUM(oi.quantity)::BIGINT AS total_quantity,
               SUM(oi.quantity * oi.price) AS total_order_value,
               MAX(oi.order_date) AS order_date
        FROM orders o
        JOIN agents a ON o.agent_id = a.agent_id
        JOIN shops s ON o.shop_id = s.shop_id
        JOIN sales_reps sr ON o.sales_rep_id = sr.sales_rep_id
        JOIN payments p ON o.payment_id = p.payment_id
        JOIN order_items oi ON o.order_id = oi.order_id
        GROUP BY o.order_id, o.agent_id, o.sales_rep_id, a.name, s.name, sr.name,
                 p.method, p.amount, o.status
        ORDER BY o.order_id
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(summaries)
}
