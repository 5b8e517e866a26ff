use axum::{
    extract::{Path, State},
    response::Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use super::{JsonBody, PathParam};
use crate::{
    commands::inventory,
    database::Database,
    error::{AppError, AppResult},
    models::{InventoryRecord, InventoryView, LowInventoryRow},
};

#[derive(Debug, Deserialize)]
pub struct RestockForm {
    agent_id: Option<i32>,
    product_id: Option<i32>,
    quantity: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RestockResponse {
    pub message: String,
    pub inventory: InventoryRecord,
}

pub async fn inventory_list(State(db): State<Database>) -> AppResult<Json<Vec<InventoryView>>> {
    Ok(Json(inventory::list_inventory(&db).await?))
}

pub async fn inventory_for_agent(
    State(db): State<Database>,
    WithRejection(Path(agent_id), _): PathParam<i32>,
) -> AppResult<Json<Vec<InventoryView>>> {
    Ok(Json(inventory::inventory_for_agent(&db, agent_id).await?))
}

pub async fn low_inventory(
    State(db): State<Database>,
    WithRejection(Path(threshold), _): PathParam<i32>,
) -> AppResult<Json<Vec<LowInventoryRow>>> {
    Ok(Json(inventory::low_inventory(&db, threshold).await?))
}

pub async fn restock(
    State(db): State<Database>,
    WithRejection(Json(form), _): JsonBody<RestockForm>,
) -> AppResult<Json<RestockResponse>> {
    let (Some(agent_id), Some(product_id)) = (form.agent_id, form.product_id) else {
        return Err(AppError::invalid("Agent ID and Product ID are required"));
    };

    // A missing quantity is validated by the ledger like any other non-positive one
    let record = inventory::restock(&db, agent_id, product_id, form.quantity.unwrap_or(0)).await?;

    Ok(Json(RestockResponse {
        message: "Inventory restocked successfully".to_string(),
        inventory: record,
    }))
}
