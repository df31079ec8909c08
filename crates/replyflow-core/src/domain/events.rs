use crate::domain::flow_instance::FlowInstanceId;
use crate::types::StepKind;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Domain event trait for everything a flow instance records
pub trait DomainEvent: Debug + Send + Sync {
    /// Returns the type of the event as a string
    fn event_type(&self) -> &'static str;

    /// Returns the flow instance ID this event is associated with
    fn flow_instance_id(&self) -> &FlowInstanceId;

    /// Returns the timestamp when the event occurred
    fn timestamp(&self) -> DateTime<Utc>;

    /// Step the event concerns, if any
    fn step(&self) -> Option<StepKind> {
        None
    }
}

/// Event: flow instance created with its first step
#[derive(Debug)]
pub struct FlowStarted {
    /// The unique identifier of the flow instance
    pub flow_instance_id: FlowInstanceId,

    /// The timestamp when the flow instance was created
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for FlowStarted {
    fn event_type(&self) -> &'static str {
        "flow.started"
    }

    fn flow_instance_id(&self) -> &FlowInstanceId {
        &self.flow_instance_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a step was configured or reconfigured
#[derive(Debug)]
pub struct StepConfigured {
    /// The unique identifier of the flow instance
    pub flow_instance_id: FlowInstanceId,

    /// The configured step
    pub step_id: StepKind,

    /// Instantiation index of the step
    pub step_index: usize,

    /// True when the step already held data
    pub reconfigured: bool,

    /// The timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for StepConfigured {
    fn event_type(&self) -> &'static str {
        "step.configured"
    }

    fn flow_instance_id(&self) -> &FlowInstanceId {
        &self.flow_instance_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn step(&self) -> Option<StepKind> {
        Some(self.step_id)
    }
}

/// Event: a new step node was appended to the flow
#[derive(Debug)]
pub struct StepInstantiated {
    /// The unique identifier of the flow instance
    pub flow_instance_id: FlowInstanceId,

    /// The new step
    pub step_id: StepKind,

    /// Instantiation index of the new step
    pub step_index: usize,

    /// Step the new edge starts from
    pub previous: Option<StepKind>,

    /// The timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for StepInstantiated {
    fn event_type(&self) -> &'static str {
        "step.instantiated"
    }

    fn flow_instance_id(&self) -> &FlowInstanceId {
        &self.flow_instance_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn step(&self) -> Option<StepKind> {
        Some(self.step_id)
    }
}

/// Event: steps were removed by a cascade delete
#[derive(Debug)]
pub struct StepsPruned {
    /// The unique identifier of the flow instance
    pub flow_instance_id: FlowInstanceId,

    /// First removed instantiation index
    pub from_index: usize,

    /// Removed steps in flow order
    pub removed: Vec<StepKind>,

    /// The timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for StepsPruned {
    fn event_type(&self) -> &'static str {
        "steps.pruned"
    }

    fn flow_instance_id(&self) -> &FlowInstanceId {
        &self.flow_instance_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn step(&self) -> Option<StepKind> {
        self.removed.first().copied()
    }
}

/// Event: every applicable step is configured
#[derive(Debug)]
pub struct FlowCompleted {
    /// The unique identifier of the flow instance
    pub flow_instance_id: FlowInstanceId,

    /// The timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for FlowCompleted {
    fn event_type(&self) -> &'static str {
        "flow.completed"
    }

    fn flow_instance_id(&self) -> &FlowInstanceId {
        &self.flow_instance_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
