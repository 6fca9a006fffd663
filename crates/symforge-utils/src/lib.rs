//! # Symforge Utilities
//!
//! Logging setup and timing helpers shared across the symforge workspace.

pub mod logging;
pub mod timer;

pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError, LoggingGuard};
pub use timer::{CheckpointTimer, TimerError};
pub use tracing::{debug, error, info, trace, warn};
