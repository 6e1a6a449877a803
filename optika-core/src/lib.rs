pub mod error;
pub mod models;
pub mod patient;
pub mod repository;

pub use error::{OrderError, OrderResult};
