pub mod commands;
pub mod service;

pub use commands::{CreateOrderCommand, GetOrderWithPatientQuery, OrderItemInput};
pub use service::OrderService;
