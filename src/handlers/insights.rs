// src/handlers/insights.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::error::AppError,
    config::AppState,
    models::insights::{InsightsRequest, InsightsResponse},
};

// POST /api/insights
// Falha do gerador externo nunca chega aqui: o serviço sempre responde,
// no pior caso com os templates determinísticos.
#[utoipa::path(
    post,
    path = "/api/insights",
    tag = "Insights",
    request_body = InsightsRequest,
    responses(
        (status = 200, description = "Insights gerados (IA ou fallback)", body = InsightsResponse)
    )
)]
pub async fn generate_insights(
    State(app_state): State<AppState>,
    Json(payload): Json<InsightsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let insights = app_state.insight_service.generate(&payload).await;

    Ok((
        StatusCode::OK,
        Json(InsightsResponse {
            success: true,
            insights,
        }),
    ))
}
