pub mod agents;
pub mod bi;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    extract::{Path, Query},
    response::Json,
};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};

use crate::error::AppError;

pub type JsonBody<T> = WithRejection<Json<T>, AppError>;
pub type PathParam<T> = WithRejection<Path<T>, AppError>;
pub type QueryParams<T> = WithRejection<Query<T>, AppError>;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Sales System API is running!" }))
}
