//! Assertion utilities for validating flow snapshots.
//!
//! This module provides helper functions for asserting properties of flow
//! snapshots and validation reports, making tests more concise and readable.

mod flow_state;

// Re-export all assertion helpers for easy access
pub use flow_state::*;
