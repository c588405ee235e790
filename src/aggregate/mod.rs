pub mod activity;
pub mod algorithm;
pub mod config;

pub use algorithm::{compliance_percentage, summarize};
pub use config::AggregationConfig;
