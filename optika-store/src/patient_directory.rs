use async_trait::async_trait;
use chrono::NaiveDate;

use optika_core::error::OrderError;
use optika_core::models::{EyePrescription, PostalAddress};
use optika_core::patient::{
    PatientDraftOptions, PatientQueryService, PatientSnapshotDraft, PrescriptionSnapshotDraft,
};
use optika_core::OrderResult;
use optika_shared::pii::Masked;

/// Source-of-truth patient row the directory serves drafts from.
#[derive(Debug, Clone)]
pub struct PatientRecord {
    pub tenant_id: String,
    pub patient_id: String,
    pub customer_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: PostalAddress,
    pub shipping_address: PostalAddress,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PrescriptionRecord {
    pub tenant_id: String,
    pub prescription_id: String,
    pub patient_id: String,
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

impl PrescriptionRecord {
    fn to_draft(&self) -> PrescriptionSnapshotDraft {
        PrescriptionSnapshotDraft {
            patient_id: self.patient_id.clone(),
            prescription_id: self.prescription_id.clone(),
            od: self.od.clone(),
            os: self.os.clone(),
            add_power: self.add_power,
            pupillary_distance: self.pupillary_distance,
            segment_height: self.segment_height,
            written_at: self.written_at,
            expires_at: self.expires_at,
            doctor_name: self.doctor_name.clone(),
            doctor_license: self.doctor_license.clone(),
        }
    }
}

/// In-memory patient directory seeded at construction time. Read-only after
/// that, so lookups need no locking.
pub struct InMemoryPatientDirectory {
    patients: Vec<PatientRecord>,
    prescriptions: Vec<PrescriptionRecord>,
}

impl InMemoryPatientDirectory {
    pub fn new(patients: Vec<PatientRecord>, prescriptions: Vec<PrescriptionRecord>) -> Self {
        Self {
            patients,
            prescriptions,
        }
    }
}

#[async_trait]
impl PatientQueryService for InMemoryPatientDirectory {
    async fn patient_snapshot_draft(
        &self,
        patient_id: &str,
        options: &PatientDraftOptions,
    ) -> OrderResult<PatientSnapshotDraft> {
        let patient = self
            .patients
            .iter()
            .find(|p| p.patient_id == patient_id && p.tenant_id == options.tenant_id)
            .ok_or_else(|| OrderError::PatientNotFound {
                patient_id: patient_id.to_string(),
                tenant_id: options.tenant_id.clone(),
            })?;

        // Caller-supplied contact overrides win over the stored record.
        // Address ids are override intent only; stored addresses are
        // returned unchanged.
        Ok(PatientSnapshotDraft {
            patient_id: patient.patient_id.clone(),
            customer_id: patient.customer_id.clone(),
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            date_of_birth: patient.date_of_birth,
            email: options
                .contact_email
                .clone()
                .or_else(|| patient.email.clone())
                .map(Masked::from),
            phone: options
                .contact_phone
                .clone()
                .or_else(|| patient.phone.clone())
                .map(Masked::from),
            billing_address: patient.billing_address.clone(),
            shipping_address: patient.shipping_address.clone(),
            notes: options.notes.clone().or_else(|| patient.notes.clone()),
        })
    }

    async fn prescription_snapshot_draft(
        &self,
        prescription_id: &str,
        tenant_id: &str,
    ) -> OrderResult<Option<PrescriptionSnapshotDraft>> {
        Ok(self
            .prescriptions
            .iter()
            .find(|p| p.prescription_id == prescription_id && p.tenant_id == tenant_id)
            .map(PrescriptionRecord::to_draft))
    }

    async fn latest_prescription_snapshot_draft(
        &self,
        patient_id: &str,
        tenant_id: &str,
    ) -> OrderResult<Option<PrescriptionSnapshotDraft>> {
        // Strictly-greater comparison while scanning in insertion order: on
        // written_at ties the earliest stored prescription wins.
        let mut latest: Option<&PrescriptionRecord> = None;
        for record in self
            .prescriptions
            .iter()
            .filter(|p| p.patient_id == patient_id && p.tenant_id == tenant_id)
        {
            match latest {
                Some(current) if record.written_at <= current.written_at => {}
                _ => latest = Some(record),
            }
        }
        Ok(latest.map(PrescriptionRecord::to_draft))
    }
}
