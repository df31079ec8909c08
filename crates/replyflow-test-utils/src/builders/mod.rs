//! Environment setup builders for testing replyflow.
//!
//! This module provides builder patterns for a flow controller wired to
//! controlled collaborators.

mod controller;

// Re-export all builders for easy access
pub use controller::*;
