use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderCreatedEvent {
    pub order_id: Uuid,
    pub tenant_id: String,
    pub customer_id: String,
    pub status: String,
    pub item_count: usize,
    pub prescription_captured: bool,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct SnapshotCapturedEvent {
    pub order_id: Uuid,
    pub tenant_id: String,
    pub snapshot_kind: String,
    pub metadata: serde_json::Value,
    pub timestamp: i64,
}
