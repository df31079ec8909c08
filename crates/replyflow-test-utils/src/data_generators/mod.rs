//! Test data generators for replyflow.
//!
//! Raw step data in the shapes the UI sends, and stores pre-filled with it.

mod steps;

// Re-export all data generators for easy access
pub use steps::*;
