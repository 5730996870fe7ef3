pub mod claim;
pub mod config;
pub mod error;
pub mod reading;
pub mod validation;

pub use error::ValidationError;
