use crate::api::error::ApiError;
use crate::api::AppState;
use crate::domain::model::{ScrapeRequest, ScrapeResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "msg": "API SEACE activa. Usa POST /scrape"
    }))
}

pub async fn scrape(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Json(request) = payload?;
    let query = request.to_query()?;
    tracing::info!("Scrape request received: {:?}", request);

    let tenders = state.source.scrape(&query).await?;
    Ok(Json(ScrapeResponse::from(tenders)))
}
