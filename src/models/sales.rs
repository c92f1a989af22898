// src/models/sales.rs
//
// Registros tipados de cada relatório. Os nomes dos campos seguem o contrato
// JSON consumido pelo frontend, por isso a mistura de português e inglês.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Cards do topo do dashboard.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct SalesOverview {
    pub faturamento: Decimal,
    pub pedidos: i64,
    pub ticket_medio: Decimal,
    pub p90_prep_seconds: f64,
    pub p90_delivery_seconds: f64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TopProduct {
    pub product: String,
    pub qty: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TopCustomization {
    pub item: String,
    pub times_added: i64,
    pub revenue_generated: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct DeliveryRegion {
    pub city: String,
    pub neighborhood: String,
    pub deliveries: i64,
    pub avg_delivery_minutes: f64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct PaymentMixEntry {
    pub payment_type: String,
    pub count: i64,
    pub total: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct DailySalesPoint {
    pub day: NaiveDate,
    pub channel: String,
    pub store_name: String,
    pub revenue: Decimal,
    pub orders: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct MonthlySalesPoint {
    pub month: String,
    pub channel: String,
    pub store_name: String,
    pub revenue: Decimal,
    pub orders: i64,
}

// Linha crua da consulta de margem; a margem em si é calculada no serviço.
#[derive(Debug, Clone, FromRow)]
pub struct ProductMarginRow {
    pub product_name: String,
    pub total_sold: i64,
    pub revenue: Decimal,
    pub total_cost: Decimal,
}

// custo aproximado: quantity * base_price (não é COGS de verdade)
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductMargin {
    pub product_name: String,
    pub total_sold: i64,
    pub revenue: Decimal,
    pub total_cost: Decimal,
    pub margin: Decimal,
}

// Receita semanal agregada no banco; a estatística roda em processo.
#[derive(Debug, Clone, FromRow)]
pub struct WeeklyRevenue {
    pub week: NaiveDate,
    pub revenue: Decimal,
    pub orders: i64,
}

#[derive(Debug, Serialize, PartialEq, ToSchema)]
pub struct AnomalyPoint {
    pub week: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
}

#[derive(Debug, Serialize, PartialEq, ToSchema)]
#[serde(untagged)]
pub enum AnomalyReport {
    Empty {
        message: String,
    },
    Stats {
        mean_revenue: f64,
        std_dev: f64,
        anomalies: Vec<AnomalyPoint>,
    },
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopStats {
    pub sales: Decimal,
    pub performance: Decimal,
}

#[derive(Debug, FromRow)]
pub struct RecentSaleRow {
    pub sale_id: i64,
    pub date: NaiveDateTime,
    pub amount: Decimal,
    pub customer: Option<String>,
    pub channel: String,
    pub store: String,
    pub status: String,
}

#[derive(Debug, FromRow)]
pub struct RecentLineItemRow {
    pub sale_id: i64,
    pub name: String,
    pub qty: i64,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentSaleProduct {
    pub name: String,
    pub qty: i64,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentSale {
    pub sale_id: i64,
    pub date: NaiveDateTime,
    pub amount: Decimal,
    pub customer: Option<String>,
    pub channel: String,
    pub store: String,
    pub status: String,
    pub products: Vec<RecentSaleProduct>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct LostCustomer {
    pub customer: String,
    pub total_orders: i64,
    pub last_order: NaiveDate,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TicketAvg {
    pub store: String,
    pub channel: String,
    pub ticket: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct DeliveryHeatCell {
    pub weekday: i32,
    pub hour: i32,
    pub avg_delivery_minutes: f64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TrendingProduct {
    pub product: String,
    pub qty: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct BucketProduct {
    pub product: String,
    pub qty: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HourlyTrendingBucket {
    pub start_hour: i32,
    pub end_hour: i32,
    pub top_product: Option<BucketProduct>,
    pub worst_product: Option<BucketProduct>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct NotSellingProduct {
    pub id: i32,
    pub product: String,
    pub last_sale: Option<NaiveDateTime>,
    pub days_without_sale: i64,
}
