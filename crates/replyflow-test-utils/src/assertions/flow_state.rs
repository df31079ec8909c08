//! Assertion utilities for validating flow snapshots.

use replyflow_core::{FlowSnapshot, StepKind, StepState, ValidationReport};
use thiserror::Error;

/// Error type for flow state validation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowStateValidationError {
    #[error("Step {step}: expected state {expected:?}, got {actual:?}")]
    InvalidStepState {
        step: StepKind,
        expected: StepState,
        actual: StepState,
    },

    #[error("Edge path mismatch: expected {expected:?}, got {actual:?}")]
    EdgePathMismatch {
        expected: Vec<StepKind>,
        actual: Vec<StepKind>,
    },

    #[error("Progress mismatch: expected {expected}, got {actual}")]
    ProgressMismatch { expected: u8, actual: u8 },

    #[error("Validation failure missing: {0}")]
    MissingFailure(String),

    #[error("Flow validation error: {0}")]
    Other(String),
}

/// Asserts that `step` is in `expected` state.
///
/// # Returns
///
/// * `Ok(())` - If the step has the expected state
/// * `Err(FlowStateValidationError)` - Otherwise
pub fn assert_step_state(
    snapshot: &FlowSnapshot,
    step: StepKind,
    expected: StepState,
) -> Result<(), FlowStateValidationError> {
    let actual = snapshot
        .step(step)
        .map(|s| s.state)
        .ok_or_else(|| FlowStateValidationError::Other(format!("step {} missing from snapshot", step)))?;

    if actual != expected {
        return Err(FlowStateValidationError::InvalidStepState {
            step,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Asserts that the edges walk exactly the given steps, in order.
///
/// An empty or single-step `expected` path means no edges.
pub fn assert_edge_path(snapshot: &FlowSnapshot, expected: &[StepKind]) -> Result<(), FlowStateValidationError> {
    let mut actual: Vec<StepKind> = Vec::with_capacity(snapshot.edges.len() + 1);
    for (i, edge) in snapshot.edges.iter().enumerate() {
        if i == 0 {
            actual.push(edge.source);
        } else if actual.last() != Some(&edge.source) {
            return Err(FlowStateValidationError::Other(format!(
                "edge {} does not continue the path",
                edge.id()
            )));
        }
        actual.push(edge.target);
    }

    let expected_path: Vec<StepKind> = if expected.len() > 1 { expected.to_vec() } else { Vec::new() };
    if actual != expected_path {
        return Err(FlowStateValidationError::EdgePathMismatch {
            expected: expected_path,
            actual,
        });
    }
    Ok(())
}

/// Asserts the snapshot's progress
pub fn assert_progress(snapshot: &FlowSnapshot, expected: u8) -> Result<(), FlowStateValidationError> {
    if snapshot.progress != expected {
        return Err(FlowStateValidationError::ProgressMismatch {
            expected,
            actual: snapshot.progress,
        });
    }
    Ok(())
}

/// Asserts that the report contains a failure with exactly `message`
pub fn assert_has_failure(report: &ValidationReport, message: &str) -> Result<(), FlowStateValidationError> {
    if report.messages().contains(&message) {
        Ok(())
    } else {
        Err(FlowStateValidationError::MissingFailure(message.to_string()))
    }
}
