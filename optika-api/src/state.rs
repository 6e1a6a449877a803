use std::sync::Arc;

use optika_order::OrderService;

#[derive(Clone)]
pub struct AppState {
    pub order_service: Arc<OrderService>,
}
