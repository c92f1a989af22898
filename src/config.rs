// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::db::{MetadataRepository, SalesRepository};
use crate::services::{InsightService, MetadataService, SalesService};

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

// Configuração carregada do ambiente (com .env em desenvolvimento).
#[derive(Clone)]
pub struct Settings {
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,

    // Chave ausente não impede o boot: o narrador só passa a usar fallback.
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,

    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let db_port: u16 = env_or("DB_PORT", "5432")
            .parse()
            .context("DB_PORT inválido")?;
        let port: u16 = env_or("PORT", "8000").parse().context("PORT inválido")?;

        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173,*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            db_host: env_or("DB_HOST", "localhost"),
            db_port,
            db_name: env_or("DB_NAME", "challenge_db"),
            db_user: env_or("DB_USER", "challenge"),
            db_password: env_or("DB_PASSWORD", "challenge_2024"),
            groq_api_key: env::var("GROQ_API_KEY").ok().filter(|key| !key.is_empty()),
            groq_model: env_or("GROQ_MODEL", "llama-3.3-70b-versatile"),
            groq_base_url: env_or("GROQ_BASE_URL", "https://api.groq.com/openai/v1"),
            cors_origins,
            port,
        })
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.db_user,
            self.db_password,
            self.db_host.trim(),
            self.db_port,
            self.db_name
        )
    }
}

// O estado compartilhado que será acessível em toda a aplicação.
// A pool é criada uma única vez aqui, no boot, e circula por clone.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,
    pub metadata_service: MetadataService,
    pub sales_service: SalesService,
    pub insight_service: InsightService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let settings = Settings::from_env()?;

        let db_pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&settings.database_url())
            .await
            .context("Falha ao conectar ao PostgreSQL")?;

        tracing::info!("✅ Pool de conexões com o PostgreSQL inicializado");

        // --- Monta o gráfico de dependências ---
        let metadata_service = MetadataService::new(MetadataRepository::new(db_pool.clone()));
        let sales_service = SalesService::new(SalesRepository::new(db_pool.clone()));
        let insight_service = InsightService::new(&settings)?;

        Ok(Self {
            db_pool,
            settings,
            metadata_service,
            sales_service,
            insight_service,
        })
    }
}
