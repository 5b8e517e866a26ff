use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use axum_extra::extract::WithRejection;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::{PathParam, QueryParams};
use crate::{
    commands::reporting::{self, ForecastInterval, ProcedureCall},
    database::Database,
    error::AppResult,
};

const DEFAULT_FORECAST_PERIODS: i32 = 12;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    interval: Option<String>,
    minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastParams {
    forecast_periods: Option<i32>,
    alpha: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationParams {
    min_support: Option<Decimal>,
    min_confidence: Option<Decimal>,
}

type ReportRows = AppResult<Json<Vec<Value>>>;

async fn run(db: &Database, call: ProcedureCall) -> ReportRows {
    Ok(Json(reporting::run_procedure(db, &call).await?))
}

pub async fn sales_forecast(
    State(db): State<Database>,
    WithRejection(Path(product_id), _): PathParam<i32>,
    WithRejection(Query(query), _): QueryParams<ForecastQuery>,
) -> ReportRows {
    let interval = ForecastInterval::from_query(query.interval.as_deref(), query.minutes)?;
    log::info!("Fetching forecast for product {} ({:?})", product_id, interval);
    run(&db, ProcedureCall::sales_forecast(product_id, interval)).await
}

pub async fn generate_sales_forecast(
    State(db): State<Database>,
    WithRejection(Path(product_id), _): PathParam<i32>,
    body: Option<Json<ForecastParams>>,
) -> ReportRows {
    let params = body.map(|Json(p)| p).unwrap_or_default();
    let periods = params.forecast_periods.unwrap_or(DEFAULT_FORECAST_PERIODS);
    let alpha = params.alpha.unwrap_or(Decimal::new(3, 1));
    run(&db, ProcedureCall::generate_sales_forecast(product_id, periods, alpha)).await
}

pub async fn product_associations(State(db): State<Database>) -> ReportRows {
    run(&db, ProcedureCall::product_associations(None)).await
}

pub async fn generate_product_associations(
    State(db): State<Database>,
    body: Option<Json<AssociationParams>>,
) -> ReportRows {
    let params = body.map(|Json(p)| p).unwrap_or_default();
    let min_support = params.min_support.unwrap_or(Decimal::new(1, 2));
    let min_confidence = params.min_confidence.unwrap_or(Decimal::new(2, 1));
    run(&db, ProcedureCall::product_associations(Some((min_support, min_confidence)))).await
}

pub async fn customer_segments(State(db): State<Database>) -> ReportRows {
    run(&db, ProcedureCall::customer_segments()).await
}

pub async fn product_recommendations(
    State(db): State<Database>,
    WithRejection(Path(shop_id), _): PathParam<i32>,
) -> ReportRows {
    run(&db, ProcedureCall::product_recommendations(shop_id)).await
}
