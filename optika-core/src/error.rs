use std::error::Error;
use uuid::Uuid;

/// Errors surfaced by the order workflow.
///
/// Tenant mismatch is deliberately indistinguishable from absence: a lookup
/// under the wrong tenant produces the same `OrderNotFound` as a lookup for
/// an id that never existed.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("patient {patient_id} not found for tenant {tenant_id}")]
    PatientNotFound { patient_id: String, tenant_id: String },

    #[error("order {order_id} not found for tenant {tenant_id}")]
    OrderNotFound { order_id: Uuid, tenant_id: String },

    /// Storage or collaborator failure, propagated verbatim. No retry
    /// happens below this boundary.
    #[error("storage operation failed: {0}")]
    Storage(#[source] Box<dyn Error + Send + Sync>),
}

pub type OrderResult<T> = Result<T, OrderError>;
