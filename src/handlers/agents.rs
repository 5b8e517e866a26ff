use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;

use super::{JsonBody, PathParam};
use crate::{
    commands::directory::{self, AgentFields},
    database::Database,
    error::AppResult,
    models::Agent,
};

#[derive(Debug, Deserialize)]
pub struct AgentForm {
    #[serde(default)]
    name: String,
    #[serde(alias = "phone_number")]
    phone_no: Option<String>,
    location: Option<String>,
}

impl From<AgentForm> for AgentFields {
    fn from(form: AgentForm) -> Self {
        Self {
            name: form.name,
            phone_no: form.phone_no.filter(|s| !s.trim().is_empty()),
            location: form.location.filter(|s| !s.trim().is_empty()),
        }
    }
}

pub async fn agents_list(State(db): State<Database>) -> AppResult<Json<Vec<Agent>>> {
    Ok(Json(directory::list_agents(&db).await?))
}

pub async fn agent_detail(
    State(db): State<Database>,
    WithRejection(Path(agent_id), _): PathParam<i32>,
) -> AppResult<Json<Agent>> {
    Ok(Json(directory::get_agent(&db, agent_id).await?))
}

pub async fn create_agent(
    State(db): State<Database>,
    WithRejection(Json(form), _): JsonBody<AgentForm>,
) -> AppResult<impl IntoResponse> {
    let agent = directory::create_agent(&db, &form.into()).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn update_agent(
    State(db): State<Database>,
    WithRejection(Path(agent_id), _): PathParam<i32>,
    WithRejection(Json(form), _): JsonBody<AgentForm>,
) -> AppResult<Json<Agent>> {
    Ok(Json(directory::update_agent(&db, agent_id, &form.into()).await?))
}

pub async fn delete_agent(
    State(db): State<Database>,
    WithRejection(Path(agent_id), _): PathParam<i32>,
) -> AppResult<Json<serde_json::Value>> {
    directory::delete_agent(&db, agent_id).await?;
    Ok(Json(json!({ "message": "Agent deleted successfully" })))
}
