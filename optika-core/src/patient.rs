use async_trait::async_trait;
use chrono::NaiveDate;

use optika_shared::pii::Masked;

use crate::error::OrderResult;
use crate::models::{EyePrescription, PostalAddress};

/// Transient projection of current patient data: the snapshot minus
/// (id, order_id, tenant_id, captured_at). Never persisted; consumed
/// immediately to build a [`crate::models::PatientSnapshot`].
#[derive(Debug, Clone)]
pub struct PatientSnapshotDraft {
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
}

#[derive(Debug, Clone)]
pub struct PrescriptionSnapshotDraft {
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
}

/// Options threaded into a patient draft request. Contact and notes
/// overrides replace the stored values when present. The address ids record
/// the caller's override intent; the directory returns the patient's stored
/// addresses unchanged.
#[derive(Debug, Clone)]
pub struct PatientDraftOptions {
    pub tenant_id: String,
    pub billing_address_id: String,
    pub shipping_address_id: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
}

/// Read-side collaborator that resolves current patient and prescription
/// data into immutable drafts.
#[async_trait]
pub trait PatientQueryService: Send + Sync {
    /// Fails with `PatientNotFound` when no patient matches
    /// (patient_id, tenant_id).
    async fn patient_snapshot_draft(
        &self,
        patient_id: &str,
        options: &PatientDraftOptions,
    ) -> OrderResult<PatientSnapshotDraft>;

    /// Returns `None` rather than erroring when the prescription does not
    /// exist under the tenant.
    async fn prescription_snapshot_draft(
        &self,
        prescription_id: &str,
        tenant_id: &str,
    ) -> OrderResult<Option<PrescriptionSnapshotDraft>>;

    /// The prescription with the maximum `written_at` among those for
    /// (patient_id, tenant_id), or `None` when none exist.
    async fn latest_prescription_snapshot_draft(
        &self,
        patient_id: &str,
        tenant_id: &str,
    ) -> OrderResult<Option<PrescriptionSnapshotDraft>>;
}
