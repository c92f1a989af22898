pub mod insight_service;
pub mod metadata_service;
pub mod sales_service;

pub use insight_service::InsightService;
pub use metadata_service::MetadataService;
pub use sales_service::SalesService;
