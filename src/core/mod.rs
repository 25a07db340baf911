//! Core utilities, configuration, and the verification decision logic

pub mod config;
pub mod error;
pub mod logging;
pub mod verification;
pub mod verifier;

// Re-exports for convenience
pub use config::*;
pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_startup_configuration};
pub use verification::{classify, normalize_phone, Decision, JoinEvent};
pub use verifier::{ContactVerdict, JoinRequestInfo, Verifier};
