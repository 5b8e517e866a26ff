use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::extract::WithRejection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{JsonBody, PathParam, QueryParams};
use crate::{
    commands::{
        catalog::{self, NewProduct, ProductChanges, DEFAULT_INITIAL_QUANTITY},
        reporting,
    },
    database::Database,
    error::{AppError, AppResult},
    models::{PriceHistoryEntry, Product, ProductWithSupplier},
};

#[derive(Debug, Deserialize)]
pub struct ProductForm {
    supplier_id: Option<i32>,
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    initial_quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ProductUpdateForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisFilters {
    supplier_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CreatedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub message: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

pub async fn products_list(State(db): State<Database>) -> AppResult<Json<Vec<ProductWithSupplier>>> {
    Ok(Json(catalog::list_products(&db).await?))
}

pub async fn products_for_supplier(
    State(db): State<Database>,
    WithRejection(Path(supplier_id), _): PathParam<i32>,
) -> AppResult<Json<Vec<ProductWithSupplier>>> {
    Ok(Json(catalog::products_for_supplier(&db, supplier_id).await?))
}

pub async fn sales_analysis(
    State(db): State<Database>,
    WithRejection(Query(filters), _): QueryParams<AnalysisFilters>,
) -> AppResult<Json<Vec<Value>>> {
    Ok(Json(reporting::product_sales_analysis(&db, filters.supplier_id).await?))
}

pub async fn price_history(State(db): State<Database>) -> AppResult<Json<Vec<PriceHistoryEntry>>> {
    Ok(Json(catalog::price_history(&db).await?))
}

pub async fn create_product(
    State(db): State<Database>,
    WithRejection(Json(form), _): JsonBody<ProductForm>,
) -> AppResult<impl IntoResponse> {
    let (Some(supplier_id), Some(name), Some(price)) = (form.supplier_id, non_empty(form.name), form.price) else {
        return Err(AppError::invalid("Supplier ID, name, and price are required"));
    };

    let new = NewProduct {
        supplier_id,
        name,
        description: non_empty(form.description),
        price,
        initial_quantity: form.initial_quantity.unwrap_or(DEFAULT_INITIAL_QUANTITY),
    };
    let (product, agents) = catalog::create_product(&db, &new).await?;

    let message = format!(
        "Product created with initial inventory of {} units for {} agents",
        new.initial_quantity, agents
    );
    Ok((StatusCode::CREATED, Json(CreatedProduct { product, message })))
}

pub async fn update_product(
    State(db): State<Database>,
    WithRejection(Path(product_id), _): PathParam<i32>,
    WithRejection(Json(form), _): JsonBody<ProductUpdateForm>,
) -> AppResult<Json<ProductWithSupplier>> {
    let (Some(name), Some(price)) = (non_empty(form.name), form.price) else {
        return Err(AppError::invalid("Name and price are required"));
    };

    let changes = ProductChanges {
        name,
        description: non_empty(form.description),
        price,
    };
    Ok(Json(catalog::update_product(&db, product_id, &changes).await?))
}
