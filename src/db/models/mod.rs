pub mod device;
pub mod ingest_run;
pub mod summary;

pub use device::{ComplianceClass, DeviceRecord};
pub use ingest_run::IngestRun;
pub use summary::RunSummary;
