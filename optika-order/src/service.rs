use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use optika_core::models::{
    OrderAggregate, OrderItem, OrderStatus, PatientSnapshot, PrescriptionSnapshot,
};
use optika_core::patient::{PatientDraftOptions, PatientQueryService};
use optika_core::repository::{OrderRepository, PatientSnapshotRepository};
use optika_core::{OrderError, OrderResult};

use crate::commands::{CreateOrderCommand, GetOrderWithPatientQuery};

/// Single supported currency until multi-currency pricing lands.
const CURRENCY_CODE: &str = "USD";

/// Orchestrates the order workflow: resolves patient and prescription
/// drafts, assembles the aggregate, and coordinates writes across the order
/// and snapshot repositories.
pub struct OrderService {
    order_repository: Arc<dyn OrderRepository>,
    snapshot_repository: Arc<dyn PatientSnapshotRepository>,
    patient_query: Arc<dyn PatientQueryService>,
}

impl OrderService {
    pub fn new(
        order_repository: Arc<dyn OrderRepository>,
        snapshot_repository: Arc<dyn PatientSnapshotRepository>,
        patient_query: Arc<dyn PatientQueryService>,
    ) -> Self {
        Self {
            order_repository,
            snapshot_repository,
            patient_query,
        }
    }

    pub async fn create_order(&self, command: CreateOrderCommand) -> OrderResult<OrderAggregate> {
        let order_id = self.order_repository.next_identity();
        // One instant for created_at/updated_at and both snapshot captures:
        // fields written in the same logical operation must not skew.
        let now = Utc::now();

        let items: Vec<OrderItem> = command
            .items
            .iter()
            .map(|input| OrderItem {
                id: Uuid::new_v4(),
                order_id,
                sku_id: input.sku_id.clone(),
                quantity: input.quantity,
                lens_selection: input.lens_selection.clone(),
                frame_selection: input.frame_selection.clone(),
            })
            .collect();

        // First fallible step: an unknown patient aborts the whole
        // operation before anything is written.
        let patient_draft = self
            .patient_query
            .patient_snapshot_draft(
                &command.patient_id,
                &PatientDraftOptions {
                    tenant_id: command.tenant_id.clone(),
                    billing_address_id: command.billing_address_id.clone(),
                    shipping_address_id: command.shipping_address_id.clone(),
                    contact_email: command.contact_email.clone(),
                    contact_phone: command.contact_phone.clone(),
                    notes: command.notes.clone(),
                },
            )
            .await?;
        let patient_snapshot =
            PatientSnapshot::from_draft(order_id, &command.tenant_id, now, patient_draft);

        let prescription_snapshot = self
            .resolve_prescription_snapshot(order_id, now, &command)
            .await?;

        let order = OrderAggregate {
            id: order_id,
            tenant_id: command.tenant_id.clone(),
            customer_id: command.customer_id.clone(),
            status: initial_status(&command),
            currency_code: CURRENCY_CODE.to_string(),
            subtotal_cents: 0,
            tax_cents: 0,
            total_cents: 0,
            created_at: now,
            updated_at: now,
            items,
            patient_snapshot: Some(patient_snapshot.clone()),
            prescription_snapshot: prescription_snapshot.clone(),
        };

        // These writes are not one transaction: a failure below can leave
        // the order persisted without its snapshots.
        let persisted = self.order_repository.create(&order).await?;
        self.snapshot_repository
            .save_patient_snapshot(&patient_snapshot)
            .await?;
        if let Some(snapshot) = &prescription_snapshot {
            self.snapshot_repository
                .save_prescription_snapshot(snapshot)
                .await?;
        }

        // Merge the in-memory snapshots instead of re-reading storage.
        Ok(OrderAggregate {
            patient_snapshot: Some(patient_snapshot),
            prescription_snapshot,
            ..persisted
        })
    }

    pub async fn get_order_with_patient(
        &self,
        query: GetOrderWithPatientQuery,
    ) -> OrderResult<OrderAggregate> {
        let order = self
            .order_repository
            .find_by_id(query.order_id, &query.tenant_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound {
                order_id: query.order_id,
                tenant_id: query.tenant_id.clone(),
            })?;

        // A missing patient snapshot is legitimate for orders that predate
        // snapshot capture, so absence is not an error here.
        let patient_snapshot = self
            .snapshot_repository
            .find_patient_by_order_id(query.order_id, &query.tenant_id)
            .await?;
        let prescription_snapshot = if query.include_prescription {
            self.snapshot_repository
                .find_prescription_by_order_id(query.order_id, &query.tenant_id)
                .await?
        } else {
            None
        };

        // The snapshot store's answer wins over anything embedded in the
        // stored order, including absence.
        Ok(OrderAggregate {
            patient_snapshot,
            prescription_snapshot,
            ..order
        })
    }

    async fn resolve_prescription_snapshot(
        &self,
        order_id: Uuid,
        captured_at: DateTime<Utc>,
        command: &CreateOrderCommand,
    ) -> OrderResult<Option<PrescriptionSnapshot>> {
        let draft = if let Some(prescription_id) = &command.prescription_id {
            self.patient_query
                .prescription_snapshot_draft(prescription_id, &command.tenant_id)
                .await?
        } else if command.capture_latest_prescription {
            self.patient_query
                .latest_prescription_snapshot_draft(&command.patient_id, &command.tenant_id)
                .await?
        } else {
            None
        };

        Ok(draft.map(|draft| {
            PrescriptionSnapshot::from_draft(order_id, &command.tenant_id, captured_at, draft)
        }))
    }
}

/// `Pending` models "needs prescription review" and applies whenever a
/// prescription was requested, even if no matching draft was found.
fn initial_status(command: &CreateOrderCommand) -> OrderStatus {
    if command.prescription_id.is_some() || command.capture_latest_prescription {
        OrderStatus::Pending
    } else {
        OrderStatus::Draft
    }
}
