pub mod app_config;
pub mod order_repo;
pub mod patient_directory;
pub mod snapshot_repo;

pub use order_repo::InMemoryOrderRepository;
pub use patient_directory::{InMemoryPatientDirectory, PatientRecord, PrescriptionRecord};
pub use snapshot_repo::InMemoryPatientSnapshotRepository;
