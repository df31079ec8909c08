// Replyflow E2E Tests
//
// This crate contains end-to-end tests across the engine, the in-memory
// backend and the test utilities.

/// Shared helpers for E2E tests
pub mod utils {
    use replyflow_core::{FlowController, FlowSnapshot, StepKind};
    use replyflow_test_utils::data_generators::canonical_script;

    /// Complete every applicable step for `service_id`, returning the snapshot after each
    pub fn complete_canonical_flow(
        controller: &mut FlowController,
        service_id: &str,
    ) -> anyhow::Result<Vec<FlowSnapshot>> {
        let mut snapshots = Vec::new();
        for (step, data) in canonical_script(service_id) {
            snapshots.push(controller.complete_step_json(step.as_str(), data)?);
        }
        Ok(snapshots)
    }

    /// Ids of the steps currently instantiated, in flow order
    pub fn instantiated_steps(controller: &FlowController) -> Vec<StepKind> {
        controller
            .flow()
            .map(|flow| flow.steps().iter().map(|node| node.id).collect())
            .unwrap_or_default()
    }

    /// Install test logging once per test binary
    pub fn init_logging() {
        replyflow_monitoring::init_test_logging();
    }
}
