pub mod error;
pub mod secret;
pub mod token;

pub use error::{Error, Result};
