//! Mock implementations of the replyflow collaborator interfaces.
//!
//! These allow controller code to be tested against precise expectations
//! about which collaborator calls are made and with what arguments.

pub mod services;

// Re-export all mocks and their creator functions for easy access
pub use services::*;
