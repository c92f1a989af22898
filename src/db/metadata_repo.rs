// src/db/metadata_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::metadata::{Channel, CustomerSummary, Store},
};

// Tabelas de referência usadas pelos filtros do dashboard.
#[derive(Clone)]
pub struct MetadataRepository {
    pool: PgPool,
}

impl MetadataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_stores(&self) -> Result<Vec<Store>, AppError> {
        let stores = sqlx::query_as::<_, Store>(
            r#"
            SELECT id::int AS id, name, city, state, is_active, is_own
            FROM stores
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    pub async fn list_channels(&self) -> Result<Vec<Channel>, AppError> {
        let channels = sqlx::query_as::<_, Channel>(
            r#"
            SELECT id::int AS id, name, type::text AS type
            FROM channels
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }

    pub async fn list_customers(&self, limit: i64) -> Result<Vec<CustomerSummary>, AppError> {
        let customers = sqlx::query_as::<_, CustomerSummary>(
            r#"
            SELECT
                c.id::int AS id,
                c.customer_name AS name,
                c.email,
                c.phone_number,
                MAX(s.created_at)::date AS last_purchase
            FROM customers c
            LEFT JOIN sales s ON s.customer_id = c.id
            GROUP BY c.id, c.customer_name, c.email, c.phone_number
            ORDER BY last_purchase DESC NULLS LAST
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}
