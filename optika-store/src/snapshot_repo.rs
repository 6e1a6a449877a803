use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use optika_core::models::{PatientSnapshot, PrescriptionSnapshot};
use optika_core::repository::PatientSnapshotRepository;
use optika_core::OrderResult;

type SnapshotKey = (String, Uuid); // (tenant_id, order_id)

/// In-memory snapshot store keyed by (tenant_id, order_id). Saves are
/// upserts, so replaying a snapshot write for the same order is harmless.
#[derive(Default)]
pub struct InMemoryPatientSnapshotRepository {
    patient_snapshots: RwLock<HashMap<SnapshotKey, PatientSnapshot>>,
    prescription_snapshots: RwLock<HashMap<SnapshotKey, PrescriptionSnapshot>>,
}

impl InMemoryPatientSnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientSnapshotRepository for InMemoryPatientSnapshotRepository {
    async fn save_patient_snapshot(&self, snapshot: &PatientSnapshot) -> OrderResult<()> {
        let key = (snapshot.tenant_id.clone(), snapshot.order_id);
        let mut snapshots = self.patient_snapshots.write().await;
        snapshots.insert(key, snapshot.clone());
        tracing::debug!(order_id = %snapshot.order_id, tenant_id = %snapshot.tenant_id, "patient snapshot stored");
        Ok(())
    }

    async fn save_prescription_snapshot(
        &self,
        snapshot: &PrescriptionSnapshot,
    ) -> OrderResult<()> {
        let key = (snapshot.tenant_id.clone(), snapshot.order_id);
        let mut snapshots = self.prescription_snapshots.write().await;
        snapshots.insert(key, snapshot.clone());
        tracing::debug!(order_id = %snapshot.order_id, tenant_id = %snapshot.tenant_id, "prescription snapshot stored");
        Ok(())
    }

    async fn find_patient_by_order_id(
        &self,
        order_id: Uuid,
        tenant_id: &str,
    ) -> OrderResult<Option<PatientSnapshot>> {
        let snapshots = self.patient_snapshots.read().await;
        Ok(snapshots.get(&(tenant_id.to_string(), order_id)).cloned())
    }

    async fn find_prescription_by_order_id(
        &self,
        order_id: Uuid,
        tenant_id: &str,
    ) -> OrderResult<Option<PrescriptionSnapshot>> {
        let snapshots = self.prescription_snapshots.read().await;
        Ok(snapshots.get(&(tenant_id.to_string(), order_id)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use optika_core::models::PostalAddress;

    fn address() -> PostalAddress {
        PostalAddress {
            line1: "123 Main".to_string(),
            line2: None,
            city: "Austin".to_string(),
            state: "TX".to_string(),
            postal_code: "78701".to_string(),
            country: "US".to_string(),
        }
    }

    fn patient_snapshot(tenant_id: &str, order_id: Uuid) -> PatientSnapshot {
        PatientSnapshot {
            id: Uuid::new_v4(),
            order_id,
            tenant_id: tenant_id.to_string(),
            patient_id: "patient-1".to_string(),
            customer_id: "customer-1".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: None,
            email: None,
            phone: None,
            billing_address: address(),
            shipping_address: address(),
            notes: None,
            captured_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let repo = InMemoryPatientSnapshotRepository::new();
        let order_id = Uuid::new_v4();

        let first = patient_snapshot("tenant-1", order_id);
        let mut second = patient_snapshot("tenant-1", order_id);
        second.first_name = "Janet".to_string();

        repo.save_patient_snapshot(&first).await.unwrap();
        repo.save_patient_snapshot(&second).await.unwrap();

        let found = repo
            .find_patient_by_order_id(order_id, "tenant-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.first_name, "Janet");
    }

    #[tokio::test]
    async fn lookups_are_tenant_scoped() {
        let repo = InMemoryPatientSnapshotRepository::new();
        let order_id = Uuid::new_v4();
        repo.save_patient_snapshot(&patient_snapshot("tenant-1", order_id))
            .await
            .unwrap();

        assert!(repo
            .find_patient_by_order_id(order_id, "tenant-2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn missing_snapshot_reads_as_none() {
        let repo = InMemoryPatientSnapshotRepository::new();
        assert!(repo
            .find_prescription_by_order_id(Uuid::new_v4(), "tenant-1")
            .await
            .unwrap()
            .is_none());
    }
}
