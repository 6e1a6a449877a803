use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use optika_shared::pii::Masked;

use crate::patient::{PatientSnapshotDraft, PrescriptionSnapshotDraft};

/// Order status in the lifecycle. Order creation only ever assigns `Draft`
/// or `Pending`; the remaining states belong to downstream lab and
/// fulfillment flows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Pending,
    Confirmed,
    PaymentPending,
    Paid,
    InLab,
    Fulfilled,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::PaymentPending => "payment_pending",
            OrderStatus::Paid => "paid",
            OrderStatus::InLab => "in_lab",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// The order together with its items and the snapshots captured when it was
/// created, read and written as one unit.
///
/// An order belongs to exactly one tenant for its entire lifetime; every
/// lookup is scoped by (id, tenant_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAggregate {
    pub id: Uuid,
    pub tenant_id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    pub currency_code: String,
    pub subtotal_cents: i32,
    pub tax_cents: i32,
    pub total_cents: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub patient_snapshot: Option<PatientSnapshot>,
    pub prescription_snapshot: Option<PrescriptionSnapshot>,
}

/// An individual line within an order. Created once at order-creation time,
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub sku_id: String,
    pub quantity: u32,
    pub lens_selection: Option<LensSelection>,
    pub frame_selection: Option<FrameSelection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LensSelection {
    pub design: String,
    pub material: String,
    pub coatings: Vec<String>,
    pub tint: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameSelection {
    pub frame_id: String,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostalAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Immutable point-in-time copy of patient data, owned by exactly one order.
/// A historical record, never resynchronized with the patient profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSnapshot {
    pub id: Uuid,
    pub order_id: Uuid,
    pub tenant_id: String,
    pub patient_id: String,
    pub customer_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<Masked<String>>,
    pub phone: Option<Masked<String>>,
    pub billing_address: PostalAddress,
    pub shipping_address: PostalAddress,
    pub notes: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl PatientSnapshot {
    /// Freeze a draft into the snapshot persisted for `order_id`.
    pub fn from_draft(
        order_id: Uuid,
        tenant_id: &str,
        captured_at: DateTime<Utc>,
        draft: PatientSnapshotDraft,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            tenant_id: tenant_id.to_string(),
            patient_id: draft.patient_id,
            customer_id: draft.customer_id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            date_of_birth: draft.date_of_birth,
            email: draft.email,
            phone: draft.phone,
            billing_address: draft.billing_address,
            shipping_address: draft.shipping_address,
            notes: draft.notes,
            captured_at,
        }
    }
}

/// Single-eye refraction values: sphere/cylinder in diopters, axis in
/// degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EyePrescription {
    pub sphere: f64,
    pub cylinder: f64,
    pub axis: f64,
    pub prism: Option<Prism>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prism {
    pub horizontal: Option<f64>,
    pub vertical: Option<f64>,
    pub base: Option<PrismBase>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrismBase {
    Up,
    Down,
    In,
    Out,
}

/// Immutable point-in-time copy of a prescription, owned by exactly one
/// order. Optional: an order may have none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionSnapshot {
    pub id: Uuid,
    pub order_id: Uuid,
    pub tenant_id: String,
    pub patient_id: String,
    pub prescription_id: String,
    pub od: EyePrescription,
    pub os: EyePrescription,
    pub add_power: Option<f64>,
    pub pupillary_distance: Option<f64>,
    pub segment_height: Option<f64>,
    pub written_at: NaiveDate,
    pub expires_at: Option<NaiveDate>,
    pub doctor_name: Option<String>,
    pub doctor_license: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl PrescriptionSnapshot {
    /// Freeze a draft into the snapshot persisted for `order_id`.
    pub fn from_draft(
        order_id: Uuid,
        tenant_id: &str,
        captured_at: DateTime<Utc>,
        draft: PrescriptionSnapshotDraft,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            tenant_id: tenant_id.to_string(),
            patient_id: draft.patient_id,
            prescription_id: draft.prescription_id,
            od: draft.od,
            os: draft.os,
            add_power: draft.add_power,
            pupillary_distance: draft.pupillary_distance,
            segment_height: draft.segment_height,
            written_at: draft.written_at,
            expires_at: draft.expires_at,
            doctor_name: draft.doctor_name,
            doctor_license: draft.doctor_license,
            captured_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PaymentPending).unwrap(),
            "\"payment_pending\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"in_lab\"").unwrap(),
            OrderStatus::InLab
        );
    }

    #[test]
    fn prism_base_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PrismBase::In).unwrap(), "\"in\"");
        assert_eq!(
            serde_json::from_str::<PrismBase>("\"out\"").unwrap(),
            PrismBase::Out
        );
    }
}
