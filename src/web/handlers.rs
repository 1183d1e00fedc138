use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use super::{Result, state::AppState};
use crate::{core::Record, validation};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub async fn healthcheck() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

pub async fn list_cached(State(state): State<AppState>) -> Result<Json<Vec<Record>>> {
    Ok(Json(state.store.load_cached().await?))
}

pub async fn list_fresh(State(state): State<AppState>) -> Result<Json<Vec<Record>>> {
    Ok(Json(state.store.load_all().await?))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Record>> {
    let id = validation::parse_id(&raw_id)?;
    Ok(Json(state.store.find_by_id(id).await?))
}

pub async fn create_record(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Record>)> {
    let payload = validation::parse_body(&body)?;
    let record = validation::validate_create(&payload)?;

    let created = state.store.insert(record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Record>> {
    let id = validation::parse_id(&raw_id)?;
    let payload = validation::parse_body(&body)?;
    let patch = validation::validate_update(id, &payload)?;

    Ok(Json(state.store.update(patch).await?))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<Record>>> {
    let id = validation::parse_id(&raw_id)?;
    Ok(Json(state.store.delete(id).await?))
}
