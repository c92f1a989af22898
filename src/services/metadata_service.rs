// src/services/metadata_service.rs

use crate::{
    common::error::AppError,
    db::MetadataRepository,
    models::metadata::{Channel, CustomerSummary, Store},
};

#[derive(Clone)]
pub struct MetadataService {
    repo: MetadataRepository,
}

impl MetadataService {
    pub fn new(repo: MetadataRepository) -> Self {
        Self { repo }
    }

    pub async fn list_stores(&self) -> Result<Vec<Store>, AppError> {
        self.repo.list_stores().await
    }

    pub async fn list_channels(&self) -> Result<Vec<Channel>, AppError> {
        self.repo.list_channels().await
    }

    pub async fn list_customers(&self, limit: i64) -> Result<Vec<CustomerSummary>, AppError> {
        self.repo.list_customers(limit).await
    }
}
