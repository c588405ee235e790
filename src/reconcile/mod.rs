pub mod merge;
pub mod scoring;

pub use merge::{merge_by_hostname, MergeResult};
pub use scoring::completeness_score;
