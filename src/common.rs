pub mod dates;
pub mod error;
