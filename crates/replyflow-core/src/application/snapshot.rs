//! Read-only views of a flow instance for rendering

use crate::{
    domain::flow_instance::{FlowEdge, FlowInstance, FlowInstanceId, StepState},
    domain::transition::TransitionEngine,
    types::StepKind,
};
use serde::Serialize;

/// Rendering view of one catalog step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSnapshot {
    /// Step id
    pub kind: StepKind,

    /// Display label
    pub label: &'static str,

    /// Rendering state
    pub state: StepState,

    /// Whether the step can be edited
    pub enabled: bool,

    /// Whether the step holds data
    pub configured: bool,

    /// Position in the flow, when instantiated
    pub step_index: Option<usize>,
}

/// Rendering view of a whole flow instance
///
/// Holds one entry per catalog step in canonical order, instantiated or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSnapshot {
    /// Flow instance id
    pub flow_instance_id: FlowInstanceId,

    /// Catalog steps in canonical order
    pub steps: Vec<StepSnapshot>,

    /// Edges in flow order
    pub edges: Vec<FlowEdge>,

    /// Step the editor points at
    pub current_step: Option<StepKind>,

    /// Completion percentage, 0..=100
    pub progress: u8,

    /// Whether every applicable step is configured
    pub complete: bool,
}

impl FlowSnapshot {
    /// Capture the current state of `flow`
    pub fn capture(engine: &TransitionEngine, flow: &FlowInstance) -> Self {
        let steps = engine
            .catalog()
            .steps_in_canonical_order()
            .iter()
            .map(|definition| {
                let node = flow.step(definition.kind);
                StepSnapshot {
                    kind: definition.kind,
                    label: definition.label,
                    state: engine.step_state(flow, definition.kind),
                    enabled: node.map_or(false, |n| n.enabled),
                    configured: node.map_or(false, |n| n.configured),
                    step_index: node.map(|n| n.step_index),
                }
            })
            .collect();

        Self {
            flow_instance_id: flow.id.clone(),
            steps,
            edges: flow.edges().to_vec(),
            current_step: flow.current_step(),
            progress: engine.completion_percentage(flow),
            complete: engine.is_complete(flow),
        }
    }

    /// View of one step
    pub fn step(&self, kind: StepKind) -> Option<&StepSnapshot> {
        self.steps.iter().find(|step| step.kind == kind)
    }

    /// Steps in a given state, canonical order
    pub fn steps_in_state(&self, state: StepState) -> Vec<StepKind> {
        self.steps
            .iter()
            .filter(|step| step.state == state)
            .map(|step| step.kind)
            .collect()
    }
}
