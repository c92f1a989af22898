// src/handlers/metadata.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::Query;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::metadata::{Channel, CustomerSummary, Store},
};

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomersParams {
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
}

// GET /api/metadata/stores
#[utoipa::path(
    get,
    path = "/api/metadata/stores",
    tag = "Metadata",
    responses(
        (status = 200, description = "Lojas disponíveis para filtro", body = Vec<Store>)
    )
)]
pub async fn get_stores(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stores = app_state.metadata_service.list_stores().await?;
    Ok((StatusCode::OK, Json(stores)))
}

// GET /api/metadata/channels
#[utoipa::path(
    get,
    path = "/api/metadata/channels",
    tag = "Metadata",
    responses(
        (status = 200, description = "Canais de venda (iFood, Rappi, Presencial etc)", body = Vec<Channel>)
    )
)]
pub async fn get_channels(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let channels = app_state.metadata_service.list_channels().await?;
    Ok((StatusCode::OK, Json(channels)))
}

// GET /api/metadata/customers
#[utoipa::path(
    get,
    path = "/api/metadata/customers",
    tag = "Metadata",
    params(CustomersParams),
    responses(
        (status = 200, description = "Clientes com a última compra", body = Vec<CustomerSummary>)
    )
)]
pub async fn get_customers(
    State(app_state): State<AppState>,
    Query(params): Query<CustomersParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let customers = app_state
        .metadata_service
        .list_customers(params.limit.unwrap_or(100))
        .await?;
    Ok((StatusCode::OK, Json(customers)))
}
