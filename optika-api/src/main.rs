use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use optika_api::{app, AppState};
use optika_core::models::{EyePrescription, PostalAddress};
use optika_order::OrderService;
use optika_store::{
    app_config::Config, InMemoryOrderRepository, InMemoryPatientDirectory,
    InMemoryPatientSnapshotRepository, PatientRecord, PrescriptionRecord,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "optika_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Optika API on port {}", config.server.port);

    let order_repository = Arc::new(InMemoryOrderRepository::new());
    let snapshot_repository = Arc::new(InMemoryPatientSnapshotRepository::new());
    let patient_directory = Arc::new(InMemoryPatientDirectory::new(
        sample_patients(),
        sample_prescriptions(),
    ));

    let order_service = Arc::new(OrderService::new(
        order_repository,
        snapshot_repository,
        patient_directory,
    ));

    let app = app(AppState { order_service });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// Demo directory contents until a real patient service is wired in.

fn sample_patients() -> Vec<PatientRecord> {
    let address = PostalAddress {
        line1: "123 Main".to_string(),
        line2: None,
        city: "Austin".to_string(),
        state: "TX".to_string(),
        postal_code: "78701".to_string(),
        country: "US".to_string(),
    };

    vec![PatientRecord {
        tenant_id: "tenant-1".to_string(),
        patient_id: "patient-1".to_string(),
        customer_id: "customer-1".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1989, 2, 4),
        email: Some("jane@example.com".to_string()),
        phone: Some("+1-555-0100".to_string()),
        billing_address: address.clone(),
        shipping_address: address,
        notes: Some("Prefers SMS updates".to_string()),
    }]
}

fn sample_prescriptions() -> Vec<PrescriptionRecord> {
    vec![PrescriptionRecord {
        tenant_id: "tenant-1".to_string(),
        prescription_id: "rx-1".to_string(),
        patient_id: "patient-1".to_string(),
        od: EyePrescription {
            sphere: -1.25,
            cylinder: -0.75,
            axis: 90.0,
            prism: None,
        },
        os: EyePrescription {
            sphere: -1.0,
            cylinder: -0.5,
            axis: 85.0,
            prism: None,
        },
        add_power: Some(0.0),
        pupillary_distance: Some(63.5),
        segment_height: Some(18.0),
        written_at: NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(),
        expires_at: NaiveDate::from_ymd_opt(2025, 8, 1),
        doctor_name: Some("Dr. Smith".to_string()),
        doctor_license: Some("TX12345".to_string()),
    }]
}
