//! Step transitions of a flow instance
//!
//! The engine owns no state. It reads the static [`StepCatalog`] and mutates
//! the [`FlowInstance`] handed to it, which keeps one flow's graph, store and
//! events together behind a single `&mut`.

use crate::{
    domain::catalog::StepCatalog,
    domain::events::FlowCompleted,
    domain::flow_instance::{FlowInstance, StepState},
    domain::payload::StepPayload,
    types::StepKind,
    CoreError,
};
use tracing::debug;

/// Outcome of completing a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Step appended by this transition, if any
    pub next_step: Option<StepKind>,

    /// Steps cascade-deleted because their applicability changed
    pub pruned: Vec<StepKind>,

    /// True when the step already held data
    pub reconfigured: bool,

    /// True when every applicable step is configured
    pub complete: bool,
}

/// Computes step transitions over a flow instance
#[derive(Debug, Clone, Copy)]
pub struct TransitionEngine {
    catalog: StepCatalog,
    count_skipped_steps: bool,
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self::new(StepCatalog::new())
    }
}

impl TransitionEngine {
    /// Create an engine over `catalog`
    pub fn new(catalog: StepCatalog) -> Self {
        Self {
            catalog,
            count_skipped_steps: true,
        }
    }

    /// Whether steps skipped by applicability count towards progress
    pub fn with_skipped_steps_counted(mut self, counted: bool) -> Self {
        self.count_skipped_steps = counted;
        self
    }

    /// The step catalog
    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    /// Complete `step` with `payload` and extend the flow.
    ///
    /// Reconfiguring a step with unchanged applicability leaves the topology
    /// untouched. When applicability of a downstream step changes, the chain
    /// is cascade-deleted from the first step that no longer belongs there.
    pub fn advance(
        &self,
        flow: &mut FlowInstance,
        step: StepKind,
        payload: StepPayload,
    ) -> Result<Advance, CoreError> {
        if payload.kind() != step {
            return Err(CoreError::PayloadMismatch {
                expected: step,
                found: payload.kind(),
            });
        }
        let position = flow
            .position_of(step)
            .ok_or(CoreError::StepNotInstantiated(step))?;
        let was_complete = self.is_complete(flow);

        let reconfigured = flow.configure(position, payload);
        let pruned = self.reconcile(flow);
        let next_step = if pruned.is_empty() {
            self.extend_after(flow, step)
        } else {
            self.extend(flow)
        };
        if next_step.is_none() && flow.is_instantiated(step) {
            flow.set_current_step(step);
        }

        let complete = self.is_complete(flow);
        if complete && !was_complete {
            let event = FlowCompleted {
                flow_instance_id: flow.id.clone(),
                timestamp: flow.updated_at,
            };
            flow.record_event(Box::new(event));
        }

        debug!(
            flow_instance_id = %flow.id,
            step = %step,
            next = ?next_step,
            pruned = pruned.len(),
            complete,
            "Step advanced"
        );

        Ok(Advance {
            next_step,
            pruned,
            reconfigured,
            complete,
        })
    }

    /// Remove `step` and every step instantiated after it, with their data.
    ///
    /// Deleting the first step destroys the flow instance and starts a fresh
    /// one. Returns the removed steps in flow order.
    pub fn delete_step(&self, flow: &mut FlowInstance, step: StepKind) -> Result<Vec<StepKind>, CoreError> {
        let position = flow
            .position_of(step)
            .ok_or(CoreError::StepNotInstantiated(step))?;
        let step_index = flow.steps()[position].step_index;

        if step_index == 0 {
            let removed: Vec<StepKind> = flow.steps().iter().map(|node| node.id).collect();
            let previous_id = flow.id.clone();
            flow.reset();
            debug!(
                previous_flow_instance_id = %previous_id,
                flow_instance_id = %flow.id,
                "First step deleted, flow restarted"
            );
            return Ok(removed);
        }

        let removed = flow.truncate_from(step_index);
        debug!(
            flow_instance_id = %flow.id,
            step = %step,
            step_index,
            removed = removed.len(),
            "Steps deleted"
        );
        Ok(removed)
    }

    /// Whether every applicable step is configured
    pub fn is_complete(&self, flow: &FlowInstance) -> bool {
        let snapshot = flow.store().snapshot();
        self.catalog
            .applicable_path(&snapshot)
            .iter()
            .all(|step| flow.step(*step).map_or(false, |node| node.configured))
    }

    /// Share of the catalog that is satisfied, 0..=100.
    ///
    /// The denominator is the full catalog. A skipped step counts as
    /// satisfied once a later canonical step has been instantiated, unless
    /// skipped steps are configured not to count.
    pub fn completion_percentage(&self, flow: &FlowInstance) -> u8 {
        let configured = flow.configured_count();
        let skipped = if self.count_skipped_steps {
            self.passed_skipped_steps(flow)
        } else {
            0
        };

        let satisfied = (configured + skipped).min(self.catalog.len());
        ((satisfied as f64 * 100.0) / self.catalog.len() as f64).round() as u8
    }

    /// Rendering state of a catalog step
    pub fn step_state(&self, flow: &FlowInstance, step: StepKind) -> StepState {
        match flow.step(step) {
            Some(node) if node.configured => StepState::Configured,
            Some(_) => StepState::Enabled,
            None => {
                let snapshot = flow.store().snapshot();
                if !flow.store().is_empty() && !self.catalog.applicability_of(step, &snapshot) {
                    StepState::Skipped
                } else {
                    StepState::Unreached
                }
            }
        }
    }

    fn passed_skipped_steps(&self, flow: &FlowInstance) -> usize {
        let furthest = match flow.steps().iter().map(|node| node.id.order()).max() {
            Some(order) => order,
            None => return 0,
        };
        let snapshot = flow.store().snapshot();

        self.catalog
            .steps_in_canonical_order()
            .iter()
            .filter(|definition| definition.order < furthest)
            .filter(|definition| !flow.is_instantiated(definition.kind))
            .filter(|definition| !definition.is_applicable(&snapshot))
            .count()
    }

    /// Cascade-delete from the first node that departs from the applicable path
    fn reconcile(&self, flow: &mut FlowInstance) -> Vec<StepKind> {
        let expected = self.catalog.applicable_path(&flow.store().snapshot());
        let divergent = flow
            .steps()
            .iter()
            .enumerate()
            .find(|(position, node)| expected.get(*position) != Some(&node.id))
            .map(|(_, node)| node.step_index);

        match divergent {
            Some(step_index) => {
                debug!(
                    flow_instance_id = %flow.id,
                    step_index,
                    "Applicability changed, pruning downstream steps"
                );
                flow.truncate_from(step_index)
            }
            None => Vec::new(),
        }
    }

    /// Append the step following `completed` when `completed` is the tail.
    ///
    /// Re-advancing an earlier step never grows the chain.
    fn extend_after(&self, flow: &mut FlowInstance, completed: StepKind) -> Option<StepKind> {
        if flow.last_step().map(|node| node.id) != Some(completed) {
            return None;
        }

        let next = self
            .catalog
            .next_applicable_after(completed, &flow.store().snapshot())?;
        if flow.is_instantiated(next) {
            return None;
        }
        flow.instantiate(next);
        Some(next)
    }

    /// Append the next applicable step after a configured last node
    fn extend(&self, flow: &mut FlowInstance) -> Option<StepKind> {
        let last = flow.last_step()?;
        if !last.configured {
            return None;
        }
        let last_id = last.id;

        let next = self
            .catalog
            .next_applicable_after(last_id, &flow.store().snapshot())?;
        flow.instantiate(next);
        Some(next)
    }
}
