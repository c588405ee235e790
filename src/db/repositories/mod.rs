pub mod history;
pub mod ingest_runs;
pub mod runs;
pub mod summaries;

pub use runs::RunWrite;
