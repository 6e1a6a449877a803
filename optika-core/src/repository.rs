use async_trait::async_trait;
use uuid::Uuid;

use crate::error::OrderResult;
use crate::models::{OrderAggregate, PatientSnapshot, PrescriptionSnapshot};

/// Repository trait for order aggregates. Every read is tenant-scoped: an
/// id that exists under another tenant behaves exactly like an absent id.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Issue a fresh order identity. Must never collide.
    fn next_identity(&self) -> Uuid;

    /// Persist a new order. No duplicate-id protection: last write wins.
    async fn create(&self, order: &OrderAggregate) -> OrderResult<OrderAggregate>;

    async fn find_by_id(
        &self,
        order_id: Uuid,
        tenant_id: &str,
    ) -> OrderResult<Option<OrderAggregate>>;
}

/// Repository trait for frozen snapshots, keyed by (tenant_id, order_id).
/// Saves are idempotent upserts; lookups return `None` rather than erroring
/// when nothing was captured for the order.
#[async_trait]
pub trait PatientSnapshotRepository: Send + Sync {
    async fn save_patient_snapshot(&self, snapshot: &PatientSnapshot) -> OrderResult<()>;

    async fn save_prescription_snapshot(
        &self,
        snapshot: &PrescriptionSnapshot,
    ) -> OrderResult<()>;

    async fn find_patient_by_order_id(
        &self,
        order_id: Uuid,
        tenant_id: &str,
    ) -> OrderResult<Option<PatientSnapshot>>;

    async fn find_prescription_by_order_id(
        &self,
        order_id: Uuid,
        tenant_id: &str,
    ) -> OrderResult<Option<PrescriptionSnapshot>>;
}
