use replyflow_core::{
    AutomationService, CoreError, DirectoryService, FlowConfig, FlowController, FlowSnapshot,
    RequestContext, StepKind,
};
use replyflow_state_inmemory::InMemoryBackendProvider;
use serde_json::Value;
use std::sync::Arc;

use crate::data_generators::step_data;

/// A started controller and the in-memory backend behind it
pub struct TestEnvironment {
    /// Controller with a started flow
    pub controller: FlowController,

    /// Backend serving any collaborator not replaced by a mock
    pub backend: Arc<InMemoryBackendProvider>,
}

impl TestEnvironment {
    /// Complete `steps` with [`step_data`] for `service_id`, returning the last snapshot
    pub fn complete(&mut self, service_id: &str, steps: &[StepKind]) -> Result<Option<FlowSnapshot>, CoreError> {
        let mut last = None;
        for step in steps {
            last = Some(
                self.controller
                    .complete_step_json(step.as_str(), step_data(*step, service_id))?,
            );
        }
        Ok(last)
    }

    /// Complete one step with raw data
    pub fn complete_with(&mut self, step: StepKind, data: Value) -> Result<FlowSnapshot, CoreError> {
        self.controller.complete_step_json(step.as_str(), data)
    }
}

/// Builder for a [`FlowController`] wired to test collaborators
pub struct TestControllerBuilder {
    config: FlowConfig,
    context: RequestContext,
    directory: Option<Arc<dyn DirectoryService>>,
    automations: Option<Arc<dyn AutomationService>>,
    backend: InMemoryBackendProvider,
}

impl Default for TestControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestControllerBuilder {
    /// Default config, anonymous context, seeded in-memory backend
    pub fn new() -> Self {
        Self {
            config: FlowConfig::default(),
            context: RequestContext::new(),
            directory: None,
            automations: None,
            backend: InMemoryBackendProvider::seeded(),
        }
    }

    /// Use `config`
    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `context` for collaborator calls
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Replace the in-memory backend
    pub fn with_backend(mut self, backend: InMemoryBackendProvider) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the directory collaborator, e.g. with a mock
    pub fn with_directory(mut self, directory: impl DirectoryService + 'static) -> Self {
        self.directory = Some(Arc::new(directory));
        self
    }

    /// Replace the automation collaborator, e.g. with a mock
    pub fn with_automation_service(mut self, automations: impl AutomationService + 'static) -> Self {
        self.automations = Some(Arc::new(automations));
        self
    }

    /// Build the controller and start its flow
    pub fn build(self) -> TestEnvironment {
        let (default_directory, default_automations) = self.backend.create_services();
        let directory = self.directory.unwrap_or(default_directory);
        let automations = self.automations.unwrap_or(default_automations);

        let mut controller =
            FlowController::new(&self.config, directory, automations).with_context(self.context);
        controller.start();

        TestEnvironment {
            controller,
            backend: Arc::new(self.backend),
        }
    }
}
