use crate::{
    database::Database,
    error::{AppError, AppResult},
    models::{Agent, AgentRef, SalesRep, SalesRepRef, Shop, ShopWithRep, Supplier},
};

#[derive(Debug, Clone, Default)]
pub struct AgentFields {
    pub name: String,
    pub phone_no: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SalesRepFields {
    pub name: String,
    pub territory: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShopFields {
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub sales_rep_id: Option<i32>,
}

fn require_name(name: &str, what: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::invalid(format!("{} name is required", what)));
    }
    Ok(())
}

// Agents

pub async fn list_agents(db: &Database) -> AppResult<Vec<Agent>> {
    let agents = sqlx::query_as::<_, Agent>("SELECT * FROM agents ORDER BY agent_id")
        .fetch_all(db)
        .await?;
    Ok(agents)
}

pub async fn agent_refs(db: &Database) -> AppResult<Vec<AgentRef>> {
    let agents = sqlx::query_as::<_, AgentRef>("SELECT agent_id, name FROM agents ORDER BY name")
        .fetch_all(db)
        .await?;
    Ok(agents)
}

pub async fn get_agent(db: &Database, agent_id: i32) -> AppResult<Agent> {
    sqlx::query_as::<_, Agent>("SELECT * FROM agents WHERE agent_id = $1")
        .bind(agent_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Agent not found"))
}

pub async fn create_agent(db: &Database, fields: &AgentFields) -> AppResult<Agent> {
    require_name(&fields.name, "Agent")?;

    let agent = sqlx::query_as::<_, Agent>(
        r#"
        INSERT INTO agents (name, phone_no, location)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(fields.name.trim())
    .bind(&fields.phone_no)
    .bind(&fields.location)
    .fetch_one(db)
    .await?;

    log::info!("Created agent {}", agent.agent_id);
    Ok(agent)
}

pub async fn update_agent(db: &Database, agent_id: i32, fields: &AgentFields) -> AppResult<Agent> {
    require_name(&fields.name, "Agent")?;

    sqlx::query_as::<_, Agent>(
        r#"
        UPDATE agents SET name = $2, phone_no = $3, location = $4
        WHERE agent_id = $1
        RETURNING *
        "#,
    )
    .bind(agent_id)
    .bind(fields.name.trim())
    .bind(&fields.phone_no)
    .bind(&fields.location)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Agent not found"))
}

/// Removes an agent and its inventory. Agents that still have orders are kept.
pub async fn delete_agent(db: &Database, agent_id: i32) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM agents WHERE agent_id = $1")
        .bind(agent_id)
        .execute(db)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::NotFound(_) => AppError::invalid("Agent is still referenced by orders"),
            other => other,
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Agent not found"));
    }

    log::info!("Deleted agent {}", agent_id);
    Ok(())
}

// Sales reps and suppliers

pub async fn sales_rep_refs(db: &Database) -> AppResult<Vec<SalesRepRef>> {
    let reps = sqlx::query_as::<_, SalesRepRef>(
        "SELECT sales_rep_id, name FROM sales_reps ORDER BY name",
    )
    .fetch_all(db)
    .await?;
    Ok(reps)
}

pub async fn create_sales_rep(db: &Database, fields: &SalesRepFields) -> AppResult<SalesRep> {
    require_name(&fields.name, "Sales rep")?;

    let rep = sqlx::query_as::<_, SalesRep>(
        r#"
        INSERT INTO sales_reps (name, territory, phone_number)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(fields.name.trim())
    .bind(&fields.territory)
    .bind(&fields.phone_number)
    .fetch_one(db)
    .await?;
    Ok(rep)
}

pub async fn suppliers(db: &Database) -> AppResult<Vec<Supplier>> {
    let suppliers = sqlx::query_as::<_, Supplier>(
        "SELECT supplier_id, name FROM suppliers ORDER BY name",
    )
    .fetch_all(db)
    .await?;
    Ok(suppliers)
}

// Shops

pub async fn list_shops(db: &Database) -> AppResult<Vec<ShopWithRep>> {
    let shops = sqlx::query_as::<_, ShopWithRep>(
        r#"
        SELECT s.shop_id, s.name, s.address, s.phone_number, s.sales_rep_id,
               sr.name AS sales_rep_name
        FROM shops s
        LEFT JOIN sales_reps sr ON s.sales_rep_id = sr.sales_rep_id
        ORDER BY s.shop_id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(shops)
}

pub async fn shops_for_sales_rep(db: &Database, sales_rep_id: i32) -> AppResult<Vec<Shop>> {
    let shops = sqlx::query_as::<_, Shop>(
        r#"
        SELECT shop_id, name, address, phone_number, sales_rep_id
        FROM shops
        WHERE sales_rep_id = $1
        ORDER BY shop_id
        "#,
    )
    .bind(sales_rep_id)
    .fetch_all(db)
    .await?;
    Ok(shops)
}

pub async fn create_shop(db: &Database, fields: &ShopFields) -> AppResult<Shop> {
    require_name(&fields.name, "Shop")?;

    let shop = sqlx::query_as::<_, Shop>(
        r#"
        INSERT INTO shops (name, address, phone_number, sales_rep_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(fields.name.trim())
    .bind(&fields.address)
    .bind(&fields.phone_number)
    .bind(fields.sales_rep_id)
    .fetch_one(db)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::NotFound(_) => AppError::not_found("Sales rep not found"),
        other => other,
    })?;

    log::info!("Created shop {}", shop.shop_id);
    Ok(shop)
}
