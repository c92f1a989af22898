// src/models/insights.rs
//
// Blocos tipados do POST /api/insights. Todos os campos são opcionais ou
// têm default: o frontend monta os blocos a partir de respostas de outros
// endpoints e nem sempre envia tudo.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductRef {
    #[serde(default)]
    pub product: Option<String>,
}

// bloco 1: produto mais vendido / mês / entrega
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrendingSnapshot {
    #[serde(default)]
    pub best_today: Option<String>,
    #[serde(default)]
    pub trending_month: Vec<ProductRef>,
    #[serde(default)]
    pub trending_products: Vec<ProductRef>,
    #[serde(default)]
    pub delivery_time: Option<f64>,
}

// bloco 2: ticket / receita / performance
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct PerformanceSnapshot {
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub avg_ticket: f64,
    #[serde(default)]
    pub performance: f64,
    #[serde(default)]
    pub total_clients: i64,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct StalledProduct {
    #[serde(default)]
    pub product_name: Option<String>,
}

// bloco 3: churn / cancelamentos / produto parado
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct RiskSnapshot {
    #[serde(default)]
    pub not_selling_products: Vec<StalledProduct>,
    #[serde(default)]
    pub canceled_orders: i64,
    #[serde(default)]
    pub retention_risk_clients: i64,
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct InsightsRequest {
    #[serde(default)]
    pub block1: TrendingSnapshot,
    #[serde(default)]
    pub block2: PerformanceSnapshot,
    #[serde(default)]
    pub block3: RiskSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InsightBlocks {
    pub highlights: String,
    pub performance: String,
    pub alerts: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InsightsResponse {
    pub success: bool,
    pub insights: InsightBlocks,
}
