use crate::{
    domain::events::{DomainEvent, FlowStarted, StepConfigured, StepInstantiated, StepsPruned},
    domain::payload::StepPayload,
    domain::store::StepConfigStore,
    types::StepKind,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Value object: Flow Instance ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowInstanceId(pub String);

impl FlowInstanceId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        FlowInstanceId(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for FlowInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rendering state of a catalog step within one flow instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// No node exists for the step yet
    Unreached,
    /// The step is not required given earlier answers
    Skipped,
    /// Node exists and awaits configuration
    Enabled,
    /// Node exists and holds configuration data
    Configured,
}

/// A step node of a flow instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowStep {
    /// Step id
    pub id: StepKind,

    /// Whether the step has been completed
    pub configured: bool,

    /// Whether the step can be edited
    pub enabled: bool,

    /// Data the step was completed with
    pub config_data: Option<StepPayload>,

    /// Position in the flow at instantiation time
    pub step_index: usize,
}

/// Instantiation-time adjacency between two steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Upstream step
    pub source: StepKind,

    /// Downstream step
    pub target: StepKind,
}

impl FlowEdge {
    /// Stable edge id for layout engines
    pub fn id(&self) -> String {
        format!("{}-{}", self.source, self.target)
    }

    /// Whether the edge touches `step`
    pub fn touches(&self, step: StepKind) -> bool {
        self.source == step || self.target == step
    }
}

/// Aggregate: one automation being configured
///
/// Steps form a simple path: nodes are only ever appended at the end and
/// removed as a suffix, so `steps[i].step_index == i` always holds.
#[derive(Debug)]
pub struct FlowInstance {
    /// Unique identifier
    pub id: FlowInstanceId,

    steps: Vec<FlowStep>,

    edges: Vec<FlowEdge>,

    store: StepConfigStore,

    current_step: Option<StepKind>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,

    events: Vec<Box<dyn DomainEvent>>,
}

impl Clone for FlowInstance {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            steps: self.steps.clone(),
            edges: self.edges.clone(),
            store: self.store.clone(),
            current_step: self.current_step,
            created_at: self.created_at,
            updated_at: self.updated_at,
            events: Vec::new(), // domain events are not cloned
        }
    }
}

impl Default for FlowInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowInstance {
    /// Create a flow instance holding a single unconfigured trigger step
    pub fn new() -> Self {
        let now = Utc::now();
        let mut instance = Self {
            id: FlowInstanceId::generate(),
            steps: Vec::with_capacity(StepKind::ALL.len()),
            edges: Vec::with_capacity(StepKind::ALL.len() - 1),
            store: StepConfigStore::new(),
            current_step: None,
            created_at: now,
            updated_at: now,
            events: Vec::with_capacity(8),
        };
        instance.seed();
        instance
    }

    /// Discard all steps, edges and data and start over under a new id
    pub(crate) fn reset(&mut self) {
        let now = Utc::now();
        self.id = FlowInstanceId::generate();
        self.steps.clear();
        self.edges.clear();
        self.store.clear();
        self.created_at = now;
        self.updated_at = now;
        self.seed();
    }

    fn seed(&mut self) {
        self.record_event(Box::new(FlowStarted {
            flow_instance_id: self.id.clone(),
            timestamp: self.created_at,
        }));
        self.instantiate(StepKind::Trigger);
    }

    /// Step nodes in flow order
    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }

    /// Edges in flow order
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Configuration store of this flow
    pub fn store(&self) -> &StepConfigStore {
        &self.store
    }

    /// Step the editor currently points at
    pub fn current_step(&self) -> Option<StepKind> {
        self.current_step
    }

    /// Node of a step, if instantiated
    pub fn step(&self, step: StepKind) -> Option<&FlowStep> {
        self.steps.iter().find(|node| node.id == step)
    }

    /// Whether a node exists for the step
    pub fn is_instantiated(&self, step: StepKind) -> bool {
        self.step(step).is_some()
    }

    /// Last node of the path
    pub fn last_step(&self) -> Option<&FlowStep> {
        self.steps.last()
    }

    /// Number of configured steps
    pub fn configured_count(&self) -> usize {
        self.steps.iter().filter(|node| node.configured).count()
    }

    pub(crate) fn position_of(&self, step: StepKind) -> Option<usize> {
        self.steps.iter().position(|node| node.id == step)
    }

    /// Store `payload` for the node at `position` and mark it configured.
    ///
    /// Returns true if the node already held data.
    pub(crate) fn configure(&mut self, position: usize, payload: StepPayload) -> bool {
        let node = &mut self.steps[position];
        let reconfigured = node.configured;
        let step_index = node.step_index;
        let step_id = node.id;

        node.configured = true;
        node.config_data = Some(payload.clone());
        self.store.put(step_index, payload);
        self.touch();

        self.record_event(Box::new(StepConfigured {
            flow_instance_id: self.id.clone(),
            step_id,
            step_index,
            reconfigured,
            timestamp: self.updated_at,
        }));
        reconfigured
    }

    /// Append an enabled, unconfigured node linked from the current last node
    pub(crate) fn instantiate(&mut self, step: StepKind) -> usize {
        let step_index = self.steps.len();
        let previous = self.steps.last().map(|node| node.id);

        self.steps.push(FlowStep {
            id: step,
            configured: false,
            enabled: true,
            config_data: None,
            step_index,
        });
        if let Some(source) = previous {
            self.edges.push(FlowEdge {
                source,
                target: step,
            });
        }
        self.current_step = Some(step);
        self.touch();

        self.record_event(Box::new(StepInstantiated {
            flow_instance_id: self.id.clone(),
            step_id: step,
            step_index,
            previous,
            timestamp: self.updated_at,
        }));
        step_index
    }

    /// Remove every node at or after `step_index`, the edges touching them and their data
    pub(crate) fn truncate_from(&mut self, step_index: usize) -> Vec<StepKind> {
        if step_index >= self.steps.len() {
            return Vec::new();
        }

        let removed: Vec<StepKind> = self.steps.drain(step_index..).map(|node| node.id).collect();
        self.edges
            .retain(|edge| !removed.iter().any(|step| edge.touches(*step)));
        self.store.remove_from(step_index);
        self.current_step = self.steps.last().map(|node| node.id);
        self.touch();

        self.record_event(Box::new(StepsPruned {
            flow_instance_id: self.id.clone(),
            from_index: step_index,
            removed: removed.clone(),
            timestamp: self.updated_at,
        }));
        removed
    }

    pub(crate) fn set_current_step(&mut self, step: StepKind) {
        self.current_step = Some(step);
    }

    /// Record a domain event
    pub fn record_event(&mut self, event: Box<dyn DomainEvent>) {
        self.events.push(event);
    }

    /// Take the events recorded since the last call
    pub fn take_events(&mut self) -> Vec<Box<dyn DomainEvent>> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
