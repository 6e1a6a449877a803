use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use optika_api::{app, AppState};
use optika_core::models::{EyePrescription, PostalAddress};
use optika_order::OrderService;
use optika_store::{
    InMemoryOrderRepository, InMemoryPatientDirectory, InMemoryPatientSnapshotRepository,
    PatientRecord, PrescriptionRecord,
};

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

fn eye(sphere: f64, cylinder: f64, axis: f64) -> EyePrescription {
    EyePrescription {
        sphere,
        cylinder,
        axis,
        prism: None,
    }
}

fn test_app() -> Router {
    let order_repository = Arc::new(InMemoryOrderRepository::new());
    let snapshot_repository = Arc::new(InMemoryPatientSnapshotRepository::new());
    let patient_directory = Arc::new(InMemoryPatientDirectory::new(
        vec![PatientRecord {
            tenant_id: "tenant-1".to_string(),
            patient_id: "patient-1".to_string(),
            customer_id: "customer-1".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1989, 2, 4),
            email: Some("jane@example.com".to_string()),
            phone: Some("+1-555-0100".to_string()),
            billing_address: address(),
            shipping_address: address(),
            notes: None,
        }],
        vec![PrescriptionRecord {
            tenant_id: "tenant-1".to_string(),
            prescription_id: "rx-1".to_string(),
            patient_id: "patient-1".to_string(),
            od: eye(-1.25, -0.75, 90.0),
            os: eye(-1.0, -0.5, 85.0),
            add_power: Some(0.0),
            pupillary_distance: Some(63.5),
            segment_height: Some(18.0),
            written_at: NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(),
            expires_at: NaiveDate::from_ymd_opt(2025, 8, 1),
            doctor_name: Some("Dr. Smith".to_string()),
            doctor_license: Some("TX12345".to_string()),
        }],
    ));

    let order_service = Arc::new(OrderService::new(
        order_repository,
        snapshot_repository,
        patient_directory,
    ));
    app(AppState { order_service })
}

fn create_order_body() -> Value {
    json!({
        "customer_id": "customer-1",
        "patient_id": "patient-1",
        "prescription_id": "rx-1",
        "contact_email": "custom@example.com",
        "shipping_address_id": "ship-addr",
        "billing_address_id": "bill-addr",
        "items": [{ "sku_id": "sku-1", "quantity": 1 }]
    })
}

fn post_order(tenant_id: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/orders")
        .header("x-tenant-id", tenant_id)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_order(app: &Router) -> Value {
    let response = app
        .clone()
        .oneshot(post_order("tenant-1", &create_order_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

#[tokio::test]
async fn create_order_returns_the_full_aggregate() {
    let app = test_app();
    let order = create_order(&app).await;

    assert_eq!(order["status"], "pending");
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["currency_code"], "USD");
    assert_eq!(order["total_cents"], 0);
    // Contact override won over the stored patient email
    assert_eq!(order["patient_snapshot"]["email"], "custom@example.com");
    assert_eq!(order["prescription_snapshot"]["prescription_id"], "rx-1");
}

#[tokio::test]
async fn create_order_without_tenant_header_is_rejected() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(create_order_body().to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_order_with_empty_items_is_rejected() {
    let app = test_app();
    let mut body = create_order_body();
    body["items"] = json!([]);

    let response = app.oneshot(post_order("tenant-1", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_order_for_unknown_patient_is_not_found() {
    let app = test_app();
    let mut body = create_order_body();
    body["patient_id"] = json!("patient-404");

    let response = app.oneshot(post_order("tenant-1", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_order_includes_prescription_only_on_request() {
    let app = test_app();
    let created = create_order(&app).await;
    let order_id = created["id"].as_str().unwrap().to_string();

    let with_include = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{}?include=prescription", order_id))
                .header("x-tenant-id", "tenant-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(with_include.status(), StatusCode::OK);
    let fetched = response_json(with_include).await;
    assert_eq!(fetched["prescription_snapshot"]["prescription_id"], "rx-1");
    assert_eq!(fetched["patient_snapshot"]["patient_id"], "patient-1");

    let without_include = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{}", order_id))
                .header("x-tenant-id", "tenant-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(without_include.status(), StatusCode::OK);
    let fetched = response_json(without_include).await;
    assert!(fetched["prescription_snapshot"].is_null());
}

#[tokio::test]
async fn get_order_is_tenant_scoped() {
    let app = test_app();
    let created = create_order(&app).await;
    let order_id = created["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{}", order_id))
                .header("x-tenant-id", "tenant-2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patient_subresource_requires_the_read_scope() {
    let app = test_app();
    let created = create_order(&app).await;
    let order_id = created["id"].as_str().unwrap().to_string();

    let denied = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{}/patient", order_id))
                .header("x-tenant-id", "tenant-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{}/patient", order_id))
                .header("x-tenant-id", "tenant-1")
                .header("x-scopes", "orders:patient:read")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    let fetched = response_json(allowed).await;
    // The patient view always includes prescription data
    assert_eq!(fetched["prescription_snapshot"]["prescription_id"], "rx-1");
}
