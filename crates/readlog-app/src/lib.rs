pub mod auth;
pub mod error;
pub mod reading;
pub mod state;
