pub mod insights;
pub mod metadata;
pub mod sales;
