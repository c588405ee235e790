//! Conditional logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! The ingestion stages emit one line per file and per sheet, which is noisy
//! on large export drops. Each stage module decides whether its chatter is
//! worth keeping:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_info!("read {} rows from {}", rows, path.display());
//! ```
//!
//! Warnings and errors always go through `log::warn!` / `log::error!`.

/// Info-level log, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Debug-level log for per-row and per-sheet detail.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}
