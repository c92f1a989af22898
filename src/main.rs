// src/main.rs

use axum::{
    Json, Router,
    http::HeaderValue,
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "API running" }))
}

// CORS a partir da configuração; "*" libera qualquer origem.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    let metadata_routes = Router::new()
        .route("/stores", get(handlers::metadata::get_stores))
        .route("/channels", get(handlers::metadata::get_channels))
        .route("/customers", get(handlers::metadata::get_customers));

    let sales_routes = Router::new()
        .route("/overview", get(handlers::sales::sales_overview))
        .route("/products/top", get(handlers::sales::top_products))
        .route("/products/margin", get(handlers::sales::products_margin))
        .route("/products/trending", get(handlers::sales::trending_products))
        .route(
            "/products/trending/hourly",
            get(handlers::sales::trending_products_hourly),
        )
        .route(
            "/products/not-selling",
            get(handlers::sales::products_not_selling),
        )
        .route("/customizations/top", get(handlers::sales::top_customizations))
        .route("/delivery/regions", get(handlers::sales::delivery_regions))
        .route(
            "/delivery/performance",
            get(handlers::sales::delivery_performance),
        )
        .route("/payment/mix", get(handlers::sales::payment_mix))
        .route("/timeseries/daily", get(handlers::sales::timeseries_daily))
        .route("/timeseries/monthly", get(handlers::sales::timeseries_monthly))
        .route("/anomaly-detection", get(handlers::sales::anomaly_detection))
        .route("/topstats", get(handlers::sales::topstats))
        .route("/recent", get(handlers::sales::recent_orders))
        .route("/customers/lost", get(handlers::sales::lost_customers))
        .route("/ticket", get(handlers::sales::ticket_avg));

    let cors = cors_layer(&app_state.settings.cors_origins);
    let port = app_state.settings.port;

    // Combina tudo no router principal
    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/metadata", metadata_routes)
        .nest("/api/sales", sales_routes)
        .route("/api/insights", post(handlers::insights::generate_insights))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(cors)
        .with_state(app_state);

    // Inicia o servidor
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
