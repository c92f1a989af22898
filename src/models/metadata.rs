// src/models/metadata.rs

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Lojas disponíveis para filtro nos relatórios.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Store {
    pub id: i32,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_active: Option<bool>,
    pub is_own: Option<bool>,
}

// Canais de venda (iFood, Rappi, Presencial etc).
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Channel {
    pub id: i32,
    pub name: String,
    // P = presencial, D = delivery
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub channel_type: Option<String>,
}

// Clientes para autocomplete / CRM, com a última compra.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct CustomerSummary {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub last_purchase: Option<NaiveDate>,
}
