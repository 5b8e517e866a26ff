use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::{JsonBody, PathParam};
use crate::{
    commands::directory::{self, AgentFields, SalesRepFields, ShopFields},
    database::Database,
    error::AppResult,
    models::{AgentRef, Shop, ShopWithRep, SalesRepRef, Supplier},
};

#[derive(Debug, Deserialize)]
pub struct NewAgentForm {
    #[serde(default)]
    name: String,
    phone_number: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SalesRepForm {
    #[serde(default)]
    name: String,
    territory: Option<String>,
    phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShopForm {
    #[serde(default)]
    name: String,
    address: Option<String>,
    phone_number: Option<String>,
    sales_rep_id: Option<i32>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

pub async fn agents(State(db): State<Database>) -> AppResult<Json<Vec<AgentRef>>> {
    Ok(Json(directory::agent_refs(&db).await?))
}

pub async fn create_agent(
    State(db): State<Database>,
    WithRejection(Json(form), _): JsonBody<NewAgentForm>,
) -> AppResult<impl IntoResponse> {
    let fields = AgentFields {
        name: form.name,
        phone_no: non_empty(form.phone_number),
        location: non_empty(form.location),
    };
    let agent = directory::create_agent(&db, &fields).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn sales_reps(State(db): State<Database>) -> AppResult<Json<Vec<SalesRepRef>>> {
    Ok(Json(directory::sales_rep_refs(&db).await?))
}

pub async fn create_sales_rep(
    State(db): State<Database>,
    WithRejection(Json(form), _): JsonBody<SalesRepForm>,
) -> AppResult<impl IntoResponse> {
    let fields = SalesRepFields {
        name: form.name,
        territory: non_empty(form.territory),
        phone_number: non_empty(form.phone_number),
    };
    let rep = directory::create_sales_rep(&db, &fields).await?;
    Ok((StatusCode::CREATED, Json(rep)))
}

pub async fn suppliers(State(db): State<Database>) -> AppResult<Json<Vec<Supplier>>> {
    Ok(Json(directory::suppliers(&db).await?))
}

pub async fn shops(State(db): State<Database>) -> AppResult<Json<Vec<ShopWithRep>>> {
    Ok(Json(directory::list_shops(&db).await?))
}

pub async fn shops_for_sales_rep(
    State(db): State<Database>,
    WithRejection(Path(sales_rep_id), _): PathParam<i32>,
) -> AppResult<Json<Vec<Shop>>> {
    Ok(Json(directory::shops_for_sales_rep(&db, sales_rep_id).await?))
}

pub async fn create_shop(
    State(db): State<Database>,
    WithRejection(Json(form), _): JsonBody<ShopForm>,
) -> AppResult<impl IntoResponse> {
    log::debug!("Creating shop {:?}", form);

    let fields = ShopFields {
        name: form.name,
        address: non_empty(form.address),
        phone_number: non_empty(form.phone_number),
        sales_rep_id: form.sales_rep_id,
    };
    let shop = directory::create_shop(&db, &fields).await?;
    Ok((StatusCode::CREATED, Json(shop)))
}
