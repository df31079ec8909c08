use crate::{
    application::snapshot::FlowSnapshot,
    config::FlowConfig,
    domain::assembler::{AutomationPayload, PayloadAssembler, ValidationReport},
    domain::catalog::StepCatalog,
    domain::events::DomainEvent,
    domain::flow_instance::FlowInstance,
    domain::payload::{merge_json, StepPayload},
    domain::services::{
        AutomationService, CreatedAutomation, DirectoryService, PagePost, PageSummary,
        PlatformSummary, ServiceKindSummary,
    },
    domain::transition::TransitionEngine,
    types::{RequestContext, StepKind},
    CoreError,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a submission attempt that reached a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The collaborator created the automation
    Created(CreatedAutomation),
    /// Validation failed; the collaborator was not called
    Rejected(ValidationReport),
}

impl SubmitOutcome {
    /// True when an automation was created
    pub fn is_created(&self) -> bool {
        matches!(self, SubmitOutcome::Created(_))
    }
}

/// Choices the UI can offer for a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "options", rename_all = "snake_case")]
pub enum StepOptions {
    /// Auto-reply service kinds for the trigger step
    ServiceKinds(Vec<ServiceKindSummary>),
    /// Connected platforms
    Platforms(Vec<PlatformSummary>),
    /// Pages of the selected platform
    Pages(Vec<PageSummary>),
    /// Posts of the selected page
    Posts(Vec<PagePost>),
    /// The step is free-form
    None,
}

impl StepOptions {
    /// Number of choices
    pub fn len(&self) -> usize {
        match self {
            StepOptions::ServiceKinds(items) => items.len(),
            StepOptions::Platforms(items) => items.len(),
            StepOptions::Pages(items) => items.len(),
            StepOptions::Posts(items) => items.len(),
            StepOptions::None => 0,
        }
    }

    /// True when there is nothing to choose from
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Facade over one editor session's flow instance
///
/// The controller owns the flow exclusively; every mutation takes `&mut self`,
/// so a flow instance can never be mutated concurrently. Only [`submit`] and
/// [`options_for`] cross an async boundary, and neither touches local state.
///
/// [`submit`]: FlowController::submit
/// [`options_for`]: FlowController::options_for
pub struct FlowController {
    engine: TransitionEngine,
    assembler: PayloadAssembler,
    directory: Arc<dyn DirectoryService>,
    automations: Arc<dyn AutomationService>,
    context: RequestContext,
    flow: Option<FlowInstance>,
    events: Vec<Box<dyn DomainEvent>>,
}

impl FlowController {
    /// Create a controller; call [`start`](FlowController::start) before editing
    pub fn new(
        config: &FlowConfig,
        directory: Arc<dyn DirectoryService>,
        automations: Arc<dyn AutomationService>,
    ) -> Self {
        let engine = TransitionEngine::new(StepCatalog::new())
            .with_skipped_steps_counted(config.count_skipped_steps);

        Self {
            engine,
            assembler: PayloadAssembler::new(config.default_status.clone()),
            directory,
            automations,
            context: RequestContext::default(),
            flow: None,
            events: Vec::new(),
        }
    }

    /// Use `context` for every collaborator call
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Context passed to collaborators
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// The current flow instance, if started
    pub fn flow(&self) -> Option<&FlowInstance> {
        self.flow.as_ref()
    }

    /// Start a fresh flow instance, discarding any previous one
    pub fn start(&mut self) -> FlowSnapshot {
        if let Some(previous) = &self.flow {
            debug!(
                flow_instance_id = %previous.id,
                undrained_events = self.events.len(),
                "Discarding flow instance"
            );
        }
        self.events.clear();
        let flow = FlowInstance::new();
        info!(flow_instance_id = %flow.id, "Flow started");
        let snapshot = FlowSnapshot::capture(&self.engine, &flow);
        self.flow = Some(flow);
        self.collect_events();
        snapshot
    }

    /// Complete `step` with a typed payload and return the updated snapshot
    pub fn complete_step(&mut self, step: StepKind, payload: StepPayload) -> Result<FlowSnapshot, CoreError> {
        let flow = self.flow.as_mut().ok_or(CoreError::FlowNotStarted)?;
        let outcome = self.engine.advance(flow, step, payload)?;
        if !outcome.pruned.is_empty() {
            info!(
                flow_instance_id = %flow.id,
                step = %step,
                pruned = ?outcome.pruned,
                "Downstream steps removed after reconfiguration"
            );
        }
        self.collect_events();
        self.snapshot()
    }

    /// Complete a step from its string id and raw UI data
    pub fn complete_step_json(&mut self, step_id: &str, data: Value) -> Result<FlowSnapshot, CoreError> {
        let step: StepKind = step_id.parse()?;
        let payload = StepPayload::from_json(step, data)?;
        self.complete_step(step, payload)
    }

    /// Deep-merge `patch` into the step's current data and complete the step with the result.
    ///
    /// Patch keys use the canonical field names of the step's payload.
    pub fn merge_step(&mut self, step_id: &str, patch: Value) -> Result<FlowSnapshot, CoreError> {
        let step: StepKind = step_id.parse()?;
        let flow = self.flow.as_ref().ok_or(CoreError::FlowNotStarted)?;
        if !flow.is_instantiated(step) {
            return Err(CoreError::StepNotInstantiated(step));
        }

        let mut merged = match flow.store().get(step) {
            Some(existing) => existing.to_json()?,
            None => Value::Object(serde_json::Map::new()),
        };
        merge_json(&mut merged, patch);

        let payload = StepPayload::from_json(step, merged)?;
        self.complete_step(step, payload)
    }

    /// Cascade-delete `step` and every step after it
    pub fn delete_step(&mut self, step: StepKind) -> Result<FlowSnapshot, CoreError> {
        let flow = self.flow.as_mut().ok_or(CoreError::FlowNotStarted)?;
        let removed = self.engine.delete_step(flow, step)?;
        info!(
            flow_instance_id = %flow.id,
            step = %step,
            removed = ?removed,
            "Steps deleted"
        );
        self.collect_events();
        self.snapshot()
    }

    /// Completion percentage, 0 when no flow is started
    pub fn progress(&self) -> u8 {
        self.flow
            .as_ref()
            .map_or(0, |flow| self.engine.completion_percentage(flow))
    }

    /// Rendering snapshot of the current flow
    pub fn snapshot(&self) -> Result<FlowSnapshot, CoreError> {
        let flow = self.flow.as_ref().ok_or(CoreError::FlowNotStarted)?;
        Ok(FlowSnapshot::capture(&self.engine, flow))
    }

    /// Assemble the automation payload and its validation report
    pub fn assemble(&self) -> Result<(AutomationPayload, ValidationReport), CoreError> {
        let flow = self.flow.as_ref().ok_or(CoreError::FlowNotStarted)?;
        Ok(self.assembler.build(flow.store().snapshot()))
    }

    /// Validate and, when valid, create the automation.
    ///
    /// A failed validation returns [`SubmitOutcome::Rejected`] without calling
    /// the collaborator. A collaborator failure is returned as
    /// [`CoreError::SubmissionError`] carrying its message; local state is
    /// untouched either way, so the call can be retried.
    pub async fn submit(&self) -> Result<SubmitOutcome, CoreError> {
        let flow = self.flow.as_ref().ok_or(CoreError::FlowNotStarted)?;
        let (payload, report) = self.assembler.build(flow.store().snapshot());

        if !report.is_valid() {
            info!(
                flow_instance_id = %flow.id,
                failures = report.failures().len(),
                "Submission rejected by validation"
            );
            return Ok(SubmitOutcome::Rejected(report));
        }

        match self.automations.create_automation(&self.context, &payload).await {
            Ok(created) => {
                info!(
                    flow_instance_id = %flow.id,
                    automation_id = %created.id,
                    "Automation created"
                );
                Ok(SubmitOutcome::Created(created))
            }
            Err(e) => {
                warn!(flow_instance_id = %flow.id, error = %e, "Automation creation failed");
                Err(CoreError::SubmissionError(e.message))
            }
        }
    }

    /// Choices to offer for `step`, based on earlier steps' data.
    ///
    /// A missing prerequisite (no platform chosen yet for pages, no page for
    /// posts) yields an empty list rather than an error, as does the post step
    /// of a service that never visits it.
    pub async fn options_for(&self, step: StepKind) -> Result<StepOptions, CoreError> {
        let flow = self.flow.as_ref().ok_or(CoreError::FlowNotStarted)?;
        let ctx = &self.context;
        let external = |e: crate::CollaboratorError| CoreError::ExternalDependencyError(e.message);

        let options = match step {
            StepKind::Trigger => StepOptions::ServiceKinds(
                self.directory
                    .list_auto_reply_service_kinds(ctx)
                    .await
                    .map_err(external)?,
            ),
            StepKind::Platform => {
                StepOptions::Platforms(self.directory.list_platforms(ctx).await.map_err(external)?)
            }
            StepKind::Page => {
                let platform_id = flow
                    .store()
                    .snapshot()
                    .platform()
                    .map(|platform| platform.platform_id.clone())
                    .filter(|id| !id.is_empty());
                match platform_id {
                    Some(id) => StepOptions::Pages(
                        self.directory
                            .list_pages(ctx, Some(id))
                            .await
                            .map_err(external)?,
                    ),
                    None => StepOptions::Pages(Vec::new()),
                }
            }
            StepKind::Post => {
                let store = flow.store().snapshot();
                let page_id = store
                    .page()
                    .map(|page| page.page_id.clone())
                    .filter(|id| !id.is_empty())
                    .filter(|_| self.engine.catalog().applicability_of(StepKind::Post, &store));
                match page_id {
                    Some(id) => StepOptions::Posts(
                        self.directory
                            .list_page_posts(ctx, &id)
                            .await
                            .map_err(external)?,
                    ),
                    None => StepOptions::Posts(Vec::new()),
                }
            }
            StepKind::Keywords | StepKind::Response | StepKind::Config => StepOptions::None,
        };

        debug!(step = %step, count = options.len(), "Step options loaded");
        Ok(options)
    }

    /// Domain events recorded since the last call
    pub fn take_events(&mut self) -> Vec<Box<dyn DomainEvent>> {
        std::mem::take(&mut self.events)
    }

    fn collect_events(&mut self) {
        let Some(flow) = self.flow.as_mut() else {
            return;
        };
        for event in flow.take_events() {
            debug!(
                event_type = event.event_type(),
                flow_instance_id = %event.flow_instance_id(),
                step = ?event.step(),
                "Domain event"
            );
            self.events.push(event);
        }
    }
}
