use std::collections::HashMap;

use sqlx::{PgConnection, PgExecutor};

use crate::{
    database::Database,
    error::{AppError, AppResult},
    models::{InventoryRecord, InventoryView, LowInventoryRow},
};

const INVENTORY_VIEW_SQL: &str = r#"
    SELECT i.agent_id, i.product_id, i.quantity, i.last_update_date,
           p.name AS product_name, a.name AS agent_name, s.name AS supplier_name
    FROM inventory i
    JOIN products p ON i.product_id = p.product_id
    JOIN agents a ON i.agent_id = a.agent_id
    JOIN suppliers s ON p.supplier_id = s.supplier_id
"#;

/// On-hand quantity for an agent and product. A missing record reads as zero.
pub async fn get_quantity<'e, E>(db: E, agent_id: i32, product_id: i32) -> AppResult<i32>
where
    E: PgExecutor<'e>,
{
    let quantity = sqlx::query_scalar::<_, i32>(
        "SELECT quantity FROM inventory WHERE agent_id = $1 AND product_id = $2",
    )
    .bind(agent_id)
    .bind(product_id)
    .fetch_optional(db)
    .await?;

    Ok(quantity.unwrap_or(0))
}

/// Adds `delta` units to the agent's stock of a product, creating the record on
/// first restock. Repeated calls accumulate.
pub async fn restock(
    db: &Database,
    agent_id: i32,
    product_id: i32,
    delta: i32,
) -> AppResult<InventoryRecord> {
    if delta <= 0 {
        return Err(AppError::invalid("Valid quantity is required"));
    }

    let record = sqlx::query_as::<_, InventoryRecord>(
        r#"
        INSERT INTO inventory (agent_id, product_id, quantity, last_update_date)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (agent_id, product_id)
        DO UPDATE SET quantity = inventory.quantity + EXCLUDED.quantity,
                      last_update_date = NOW()
        RETURNING agent_id, product_id, quantity, last_update_date
        "#,
    )
    .bind(agent_id)
    .bind(product_id)
    .bind(delta)
    .fetch_one(db)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::NotFound(_) => AppError::not_found(format!(
            "Agent {} or product {} does not exist",
            agent_id, product_id
        )),
        other => other,
    })?;

    log::info!(
        "Restocked product {} for agent {} by {} (now {})",
        product_id,
        agent_id,
        delta,
        record.quantity
    );
    Ok(record)
}

/// Row-locks the agent's inventory for the given products and returns the
/// on-hand quantity per product. Locks are taken in ascending product order so
/// overlapping orders cannot deadlock. Products without a record are absent
/// from the map.
pub async fn lock_for_order(
    conn: &mut PgConnection,
    agent_id: i32,
    product_ids: &[i32],
) -> AppResult<HashMap<i32, i32>> {
    let rows = sqlx::query_as::<_, (i32, i32)>(
        r#"
        SELECT product_id, quantity
        FROM inventory
        WHERE agent_id = $1 AND product_id = ANY($2)
        ORDER BY product_id
        FOR UPDATE
        "#,
    )
    .bind(agent_id)
    .bind(product_ids)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Takes `quantity` units out of the agent's stock. Must run inside the order
/// transaction; the guarded update never lets the quantity go below zero.
pub async fn reserve_and_decrement(
    conn: &mut PgConnection,
    agent_id: i32,
    product_id: i32,
    quantity: i32,
) -> AppResult<InventoryRecord> {
    let updated = sqlx::query_as::<_, InventoryRecord>(
        r#"
        UPDATE inventory
        SET quantity = quantity - $3, last_update_date = NOW()
        WHERE agent_id = $1 AND product_id = $2 AND quantity >= $3
        RETURNING agent_id, product_id, quantity, last_update_date
        "#,
    )
    .bind(agent_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await?;

    match updated {
        Some(record) => Ok(record),
        None => {
            let available = get_quantity(&mut *conn, agent_id, product_id).await?;
            Err(AppError::InsufficientInventory {
                product_id,
                available,
                requested: quantity,
            })
        }
    }
}

pub async fn list_inventory(db: &Database) -> AppResult<Vec<InventoryView>> {
    let rows = sqlx::query_as::<_, InventoryView>(INVENTORY_VIEW_SQL)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn inventory_for_agent(db: &Database, agent_id: i32) -> AppResult<Vec<InventoryView>> {
    let sql = format!("{} WHERE i.agent_id = $1 ORDER BY i.product_id", INVENTORY_VIEW_SQL);
    let rows = sqlx::query_as::<_, InventoryView>(&sql)
        .bind(agent_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn low_inventory(db: &Database, threshold: i32) -> AppResult<Vec<LowInventoryRow>> {
    let rows = sqlx::query_as::<_, LowInventoryRow>(
        r#"
        SELECT i.product_id, i.agent_id, p.name AS product_name, i.quantity,
               a.name AS agent_name, s.name AS supplier_name
        FROM inventory i
        JOIN products p ON i.product_id = p.product_id
        JOIN agents a ON i.agent_id = a.agent_id
        JOIN suppliers s ON p.supplier_id = s.supplier_id
        WHERE i.quantity <= $1
        ORDER BY i.quantity, i.agent_id, i.product_id
        "#,
    )
    .bind(threshold)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
