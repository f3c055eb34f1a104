//! Logging infrastructure
//!
//! Console or JSON output filtered through `RUST_LOG` or the configured filter.

mod logging;

pub use logging::{LoggingConfig, LoggingError, init_logging};
