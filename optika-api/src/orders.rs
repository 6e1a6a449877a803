use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use optika_core::models::{FrameSelection, LensSelection, OrderAggregate};
use optika_order::{CreateOrderCommand, GetOrderWithPatientQuery, OrderItemInput};
use optika_shared::models::events::{OrderCreatedEvent, SnapshotCapturedEvent};

use crate::context::{parse_csv, RequestContext};
use crate::error::AppError;
use crate::state::AppState;

/// Scope required to read the patient sub-resource.
pub const PATIENT_READ_SCOPE: &str = "orders:patient:read";

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub patient_id: String,
    pub prescription_id: Option<String>,
    #[serde(default)]
    pub capture_latest_prescription: bool,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub shipping_address_id: String,
    pub billing_address_id: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItemRequest>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub sku_id: String,
    pub quantity: u32,
    pub lens_selection: Option<LensSelection>,
    pub frame_selection: Option<FrameSelection>,
}

#[derive(Debug, Deserialize)]
pub struct GetOrderParams {
    pub include: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/patient", get(get_order_patient))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /orders
/// Create an order, freezing patient (and optionally prescription) snapshots
async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderAggregate>), AppError> {
    let context = RequestContext::from_headers(&headers)?;
    let command = map_to_command(payload, &context)?;

    let order = state.order_service.create_order(command).await?;
    log_order_created(&order);

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{order_id}?include=prescription
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Query(params): Query<GetOrderParams>,
    headers: HeaderMap,
) -> Result<Json<OrderAggregate>, AppError> {
    let context = RequestContext::from_headers(&headers)?;
    let includes = parse_csv(params.include);

    let order = state
        .order_service
        .get_order_with_patient(GetOrderWithPatientQuery {
            order_id,
            tenant_id: context.tenant_id,
            include_prescription: includes.iter().any(|entry| entry == "prescription"),
        })
        .await?;

    Ok(Json(order))
}

/// GET /orders/{order_id}/patient
/// Patient view of an order; requires `orders:patient:read` and always
/// includes prescription data
async fn get_order_patient(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<OrderAggregate>, AppError> {
    let context = RequestContext::from_headers(&headers)?;
    context.ensure_scope(PATIENT_READ_SCOPE)?;

    let order = state
        .order_service
        .get_order_with_patient(GetOrderWithPatientQuery {
            order_id,
            tenant_id: context.tenant_id,
            include_prescription: true,
        })
        .await?;

    Ok(Json(order))
}

// ============================================================================
// Mapping & Telemetry
// ============================================================================

fn map_to_command(
    payload: CreateOrderRequest,
    context: &RequestContext,
) -> Result<CreateOrderCommand, AppError> {
    if payload.items.is_empty() {
        return Err(AppError::ValidationError(
            "items must not be empty".to_string(),
        ));
    }
    if payload.items.iter().any(|item| item.quantity == 0) {
        return Err(AppError::ValidationError(
            "item quantity must be positive".to_string(),
        ));
    }

    Ok(CreateOrderCommand {
        tenant_id: context.tenant_id.clone(),
        customer_id: payload.customer_id,
        patient_id: payload.patient_id,
        prescription_id: payload.prescription_id,
        capture_latest_prescription: payload.capture_latest_prescription,
        contact_email: payload.contact_email,
        contact_phone: payload.contact_phone,
        shipping_address_id: payload.shipping_address_id,
        billing_address_id: payload.billing_address_id,
        notes: payload.notes,
        items: payload
            .items
            .into_iter()
            .map(|item| OrderItemInput {
                sku_id: item.sku_id,
                quantity: item.quantity,
                lens_selection: item.lens_selection,
                frame_selection: item.frame_selection,
            })
            .collect(),
        metadata: payload.metadata,
        idempotency_key: None,
    })
}

fn log_order_created(order: &OrderAggregate) {
    let timestamp = chrono::Utc::now().timestamp();

    let event = OrderCreatedEvent {
        order_id: order.id,
        tenant_id: order.tenant_id.clone(),
        customer_id: order.customer_id.clone(),
        status: order.status.as_str().to_string(),
        item_count: order.items.len(),
        prescription_captured: order.prescription_snapshot.is_some(),
        timestamp,
    };
    tracing::info!(event = ?event, "order created");

    if let Some(snapshot) = &order.patient_snapshot {
        let event = SnapshotCapturedEvent {
            order_id: order.id,
            tenant_id: order.tenant_id.clone(),
            snapshot_kind: "patient".to_string(),
            metadata: serde_json::json!({ "patient_id": snapshot.patient_id }),
            timestamp,
        };
        tracing::info!(event = ?event, "snapshot captured");
    }
    if let Some(snapshot) = &order.prescription_snapshot {
        let event = SnapshotCapturedEvent {
            order_id: order.id,
            tenant_id: order.tenant_id.clone(),
            snapshot_kind: "prescription".to_string(),
            metadata: serde_json::json!({ "prescription_id": snapshot.prescription_id }),
            timestamp,
        };
        tracing::info!(event = ?event, "snapshot captured");
    }
}
