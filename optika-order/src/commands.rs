use serde::{Deserialize, Serialize};
use uuid::Uuid;

use optika_core::models::{FrameSelection, LensSelection};

/// Everything the caller layer has validated and resolved for a new order.
/// Tenant id and caller identity come from the request context, not the
/// request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderCommand {
    pub tenant_id: String,
    pub customer_id: String,
    pub patient_id: String,
    pub prescription_id: Option<String>,
    pub capture_latest_prescription: bool,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub shipping_address_id: String,
    pub billing_address_id: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItemInput>,
    pub metadata: Option<serde_json::Value>,
    /// Accepted but not read anywhere yet: a retry after a partial failure
    /// still creates a second order.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub sku_id: String,
    pub quantity: u32,
    pub lens_selection: Option<LensSelection>,
    pub frame_selection: Option<FrameSelection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOrderWithPatientQuery {
    pub order_id: Uuid,
    pub tenant_id: String,
    pub include_prescription: bool,
}
