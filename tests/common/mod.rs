//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;
pub mod recorder;

#[allow(unused_imports)]
pub use fixtures::{admin, join_request, user, TestEnvironment, ADMIN_ID, GROUP_CHAT, OTHER_GROUP_CHAT};
#[allow(unused_imports)]
pub use recorder::{GatewayCall, RecordingGateway};
