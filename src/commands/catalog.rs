use rust_decimal::Decimal;

use crate::{
    database::Database,
    error::{AppError, AppResult},
    models::{PriceHistoryEntry, Product, ProductWithSupplier},
};

pub const DEFAULT_INITIAL_QUANTITY: i32 = 100;

const PRODUCT_WITH_SUPPLIER_SQL: &str = r#"
    SELECT p.product_id, p.supplier_id, p.name, p.description, p.price,
           s.name AS supplier_name
    FROM products p
    JOIN suppliers s ON p.supplier_id = s.supplier_id
"#;

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub supplier_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub initial_quantity: i32,
}

#[derive(Debug, Clone)]
pub struct ProductChanges {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

fn validate_fields(name: &str, price: Decimal) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::invalid("Product name is required"));
    }
    if price < Decimal::ZERO {
        return Err(AppError::invalid("Price cannot be negative"));
    }
    Ok(())
}

pub async fn list_products(db: &Database) -> AppResult<Vec<ProductWithSupplier>> {
    let sql = format!("{} ORDER BY p.product_id", PRODUCT_WITH_SUPPLIER_SQL);
    let products = sqlx::query_as::<_, ProductWithSupplier>(&sql)
        .fetch_all(db)
        .await?;
    Ok(products)
}

pub async fn products_for_supplier(
    db: &Database,
    supplier_id: i32,
) -> AppResult<Vec<ProductWithSupplier>> {
    let sql = format!(
        "{} WHERE p.supplier_id = $1 ORDER BY p.product_id",
        PRODUCT_WITH_SUPPLIER_SQL
    );
    let products = sqlx::query_as::<_, ProductWithSupplier>(&sql)
        .bind(supplier_id)
        .fetch_all(db)
        .await?;
    Ok(products)
}

/// Creates a product and seeds every existing agent's inventory with
/// `initial_quantity` units, in one transaction. Returns the product and the
/// number of agents stocked.
pub async fn create_product(db: &Database, new: &NewProduct) -> AppResult<(Product, u64)> {
    validate_fields(&new.name, new.price)?;
    if new.initial_quantity < 0 {
        return Err(AppError::invalid("Initial quantity cannot be negative"));
    }

    let mut tx = db.begin().await?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (supplier_id, name, description, price)
        VALUES ($1, $2, $3, $4)
        RETURNING product_id, supplier_id, name, description, price
        "#,
    )
    .bind(new.supplier_id)
    .bind(new.name.trim())
    .bind(&new.description)
    .bind(new.price)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::NotFound(_) => {
            AppError::not_found(format!("Supplier {} not found", new.supplier_id))
        }
        other => other,
    })?;

    let stocked = sqlx::query(
        r#"
        INSERT INTO inventory (agent_id, product_id, quantity, last_update_date)
        SELECT agent_id, $1, $2, NOW() FROM agents
        "#,
    )
    .bind(product.product_id)
    .bind(new.initial_quantity)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    log::info!(
        "Created product {} with {} units for {} agents",
        product.product_id,
        new.initial_quantity,
        stocked
    );
    Ok((product, stocked))
}

/// Updates a product in place. A price change appends a history row with the
/// old and new price, in the same transaction as the update.
pub async fn update_product(
    db: &Database,
    product_id: i32,
    changes: &ProductChanges,
) -> AppResult<ProductWithSupplier> {
    validate_fields(&changes.name, changes.price)?;

    let mut tx = db.begin().await?;

    let old_price = sqlx::query_scalar::<_, Decimal>(
        "SELECT price FROM products WHERE product_id = $1 FOR UPDATE",
    )
    .bind(product_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    sqlx::query(
        "UPDATE products SET name = $2, description = $3, price = $4 WHERE product_id = $1",
    )
    .bind(product_id)
    .bind(changes.name.trim())
    .bind(&changes.description)
    .bind(changes.price)
    .execute(&mut *tx)
    .await?;

    if old_price != changes.price {
        sqlx::query(
            r#"
            INSERT INTO product_price_history (product_id, old_price, new_price, change_date)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(product_id)
        .bind(old_price)
        .bind(changes.price)
        .execute(&mut *tx)
        .await?;
    }

    let sql = format!("{} WHERE p.product_id = $1", PRODUCT_WITH_SUPPLIER_SQL);
    let updated = sqlx::query_as::<_, ProductWithSupplier>(&sql)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(updated)
}

pub async fn price_history(db: &Database) -> AppResult<Vec<PriceHistoryEntry>> {
    let history = sqlx::query_as::<_, PriceHistoryEntry>(
        r#"
        SELECT pph.history_id, pph.product_id, p.name AS product_name,
               pph.old_price, pph.new_price, pph.change_date
        FROM product_price_history pph
        JOIN products p ON pph.product_id = p.product_id
        ORDER BY p.product_id, pph.change_date, pph.history_id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert!(matches!(
            validate_fields("   ", Decimal::ONE),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn negative_prices_are_rejected() {
        assert!(matches!(
            validate_fields("Soap", Decimal::new(-5, 1)),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(validate_fields("Soap", Decimal::ZERO).is_ok());
    }
}
