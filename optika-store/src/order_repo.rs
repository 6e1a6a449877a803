use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use optika_core::models::OrderAggregate;
use optika_core::repository::OrderRepository;
use optika_core::OrderResult;

/// In-memory order store. Orders are keyed by id; tenant scoping is applied
/// on read, so a wrong-tenant lookup behaves exactly like a miss.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, OrderAggregate>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    fn next_identity(&self) -> Uuid {
        Uuid::new_v4()
    }

    async fn create(&self, order: &OrderAggregate) -> OrderResult<OrderAggregate> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order.clone());
        tracing::debug!(order_id = %order.id, tenant_id = %order.tenant_id, "order stored");
        Ok(order.clone())
    }

    async fn find_by_id(
        &self,
        order_id: Uuid,
        tenant_id: &str,
    ) -> OrderResult<Option<OrderAggregate>> {
        let orders = self.orders.read().await;
        Ok(orders
            .get(&order_id)
            .filter(|order| order.tenant_id == tenant_id)
            .cloned())
    }
}
