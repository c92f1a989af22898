pub mod filter;
pub mod metadata_repo;
pub mod sales_repo;

pub use filter::SqlFilter;
pub use metadata_repo::MetadataRepository;
pub use sales_repo::SalesRepository;
